//! Backing store abstraction
//!
//! The core persists through one narrow relational-style interface:
//! point lookups, filtered scans, id sequences, and a transactional write
//! batch. A store fault must never crash the caller - every failure surfaces
//! as a typed [`StoreError`] and, at the service boundary, as an `AppError`.
//!
//! [`MemoryStore`] is the reference implementation; a relational driver is a
//! configuration choice behind the same trait.

mod locks;
mod memory;

pub use locks::LockRegistry;
pub use memory::MemoryStore;

use async_trait::async_trait;
use shared::error::{AppError, ErrorCode};
use shared::models::{Account, Order, Product};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Backing store error types
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store cannot be reached at all
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The operation exceeded its time budget
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    /// A uniqueness or existence constraint was violated
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// Any other backend fault
    #[error("Store error: {0}")]
    Backend(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => {
                AppError::with_message(ErrorCode::StorageUnavailable, msg)
            }
            StoreError::Timeout(limit) => AppError::with_message(
                ErrorCode::StorageTimeout,
                format!("Backing store operation timed out after {:?}", limit),
            ),
            StoreError::Constraint(msg) | StoreError::Backend(msg) => {
                AppError::with_message(ErrorCode::StorageError, msg)
            }
        }
    }
}

/// Monotonic id sequences owned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSequence {
    Product,
    Order,
}

/// One write in a transactional batch
///
/// Updates and deletes of absent rows fail the whole batch with
/// [`StoreError::Constraint`]; inserting a duplicate key does the same.
#[derive(Debug, Clone)]
pub enum WriteOp {
    InsertAccount(Account),
    UpdateAccount(Account),
    DeleteAccount(String),
    InsertProduct(Product),
    UpdateProduct(Product),
    DeleteProduct(i64),
    InsertOrder(Order),
    UpdateOrder(Order),
}

/// A transactional batch: all ops land or none do
pub type WriteBatch = Vec<WriteOp>;

/// Abstract relational persistence interface
///
/// `apply` is the single transactional boundary the order engine relies on
/// for all-or-nothing commits.
#[async_trait]
pub trait BackingStore: Send + Sync + std::fmt::Debug {
    /// Allocate the next id from a sequence
    async fn next_id(&self, sequence: IdSequence) -> StoreResult<i64>;

    async fn get_account(&self, username: &str) -> StoreResult<Option<Account>>;
    async fn list_accounts(&self) -> StoreResult<Vec<Account>>;

    async fn get_product(&self, id: i64) -> StoreResult<Option<Product>>;
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    async fn get_order(&self, id: i64) -> StoreResult<Option<Order>>;
    async fn list_orders(&self) -> StoreResult<Vec<Order>>;

    /// Apply a write batch transactionally
    async fn apply(&self, batch: WriteBatch) -> StoreResult<()>;
}

/// Bound a store operation by a time budget
///
/// An elapsed budget surfaces as [`StoreError::Timeout`]; the caller is never
/// left hanging on a stuck store.
pub async fn with_timeout<T>(
    limit: Duration,
    fut: impl Future<Output = StoreResult<T>>,
) -> StoreResult<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}
