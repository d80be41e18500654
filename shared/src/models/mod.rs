//! Data models
//!
//! Shared between the transaction core and any presentation crate.
//! All entity IDs are `i64`, assigned by the backing store; timestamps are
//! epoch millis.

pub mod account;
pub mod cart;
pub mod order;
pub mod product;

// Re-exports
pub use account::*;
pub use cart::*;
pub use order::*;
pub use product::*;
