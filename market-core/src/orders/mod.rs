//! Order engine - atomic cart commit and order lifecycle
//!
//! The only multi-entity transaction in the core lives here: converting a
//! cart into a persisted order while decrementing stock, all-or-nothing.

mod engine;

pub use engine::OrderEngine;
