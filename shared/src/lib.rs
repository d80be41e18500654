//! Shared types for the marketplace core
//!
//! Common types used across the core and any presentation crate:
//! error types, data models, and result aliases.

pub mod error;
pub mod models;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
