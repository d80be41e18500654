//! Marketplace transaction core
//!
//! In-process engine behind the storefront presentation layer. It owns the
//! state with real invariants - catalog stock, order atomicity, competitive
//! bids, role-gated mutation - and nothing else.
//!
//! # Module structure
//!
//! ```text
//! market-core/src/
//! ├── auth/          # authorization gate, sessions
//! ├── db/            # backing store trait, in-memory store, product locks
//! ├── services/      # identity, catalog, auction
//! ├── orders/        # order engine (atomic commit, status transitions)
//! ├── config.rs      # environment-driven configuration
//! ├── state.rs       # service wiring
//! └── utils/         # logging bootstrap
//! ```
//!
//! The presentation layer authenticates through [`CoreState::login`],
//! receives a [`Session`] owning its cart, and calls into the services with
//! the already-resolved account. Every mutating call consults the
//! authorization gate in [`auth`] before touching state.

pub mod auth;
pub mod config;
pub mod db;
pub mod orders;
pub mod services;
pub mod state;
pub mod utils;

// Re-export public types
pub use auth::{Permission, Session, authorize};
pub use config::CoreConfig;
pub use db::{BackingStore, LockRegistry, MemoryStore, StoreError, StoreResult};
pub use orders::OrderEngine;
pub use services::{AuctionService, BidEvent, CatalogService, IdentityService};
pub use state::CoreState;
pub use utils::logger::{init_logger, init_logger_with_level};

// Re-export unified error types from shared
pub use shared::error::{AppError, AppResult, ErrorCategory, ErrorCode};
