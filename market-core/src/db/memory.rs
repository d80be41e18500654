//! In-memory backing store
//!
//! Reference implementation of [`BackingStore`]. Tables live behind a single
//! `parking_lot::RwLock`; a write batch is staged on a copy of the tables and
//! swapped in only when every op succeeds, so a failed batch is invisible.
//!
//! Two fault knobs exist for exercising failure paths: `set_available(false)`
//! simulates a lost connection, `fail_after_ops(n)` aborts the next batch
//! mid-transaction.

use super::{BackingStore, IdSequence, StoreError, StoreResult, WriteBatch, WriteOp};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared::models::{Account, Order, Product};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

/// Relational-style tables
#[derive(Debug, Clone, Default)]
struct Tables {
    accounts: HashMap<String, Account>,
    products: BTreeMap<i64, Product>,
    orders: BTreeMap<i64, Order>,
}

impl Tables {
    fn apply_op(&mut self, op: &WriteOp) -> StoreResult<()> {
        match op {
            WriteOp::InsertAccount(account) => {
                if self.accounts.contains_key(&account.username) {
                    return Err(StoreError::Constraint(format!(
                        "account '{}' already exists",
                        account.username
                    )));
                }
                self.accounts
                    .insert(account.username.clone(), account.clone());
            }
            WriteOp::UpdateAccount(account) => {
                if !self.accounts.contains_key(&account.username) {
                    return Err(StoreError::Constraint(format!(
                        "account '{}' does not exist",
                        account.username
                    )));
                }
                self.accounts
                    .insert(account.username.clone(), account.clone());
            }
            WriteOp::DeleteAccount(username) => {
                if self.accounts.remove(username).is_none() {
                    return Err(StoreError::Constraint(format!(
                        "account '{}' does not exist",
                        username
                    )));
                }
            }
            WriteOp::InsertProduct(product) => {
                if self.products.contains_key(&product.id) {
                    return Err(StoreError::Constraint(format!(
                        "product {} already exists",
                        product.id
                    )));
                }
                self.products.insert(product.id, product.clone());
            }
            WriteOp::UpdateProduct(product) => {
                if !self.products.contains_key(&product.id) {
                    return Err(StoreError::Constraint(format!(
                        "product {} does not exist",
                        product.id
                    )));
                }
                self.products.insert(product.id, product.clone());
            }
            WriteOp::DeleteProduct(id) => {
                if self.products.remove(id).is_none() {
                    return Err(StoreError::Constraint(format!(
                        "product {} does not exist",
                        id
                    )));
                }
            }
            WriteOp::InsertOrder(order) => {
                if self.orders.contains_key(&order.id) {
                    return Err(StoreError::Constraint(format!(
                        "order {} already exists",
                        order.id
                    )));
                }
                self.orders.insert(order.id, order.clone());
            }
            WriteOp::UpdateOrder(order) => {
                if !self.orders.contains_key(&order.id) {
                    return Err(StoreError::Constraint(format!(
                        "order {} does not exist",
                        order.id
                    )));
                }
                self.orders.insert(order.id, order.clone());
            }
        }
        Ok(())
    }
}

/// In-memory [`BackingStore`]
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    product_seq: AtomicI64,
    order_seq: AtomicI64,
    available: AtomicBool,
    /// One-shot: abort the next batch after this many ops
    fail_after: Mutex<Option<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            product_seq: AtomicI64::new(1),
            order_seq: AtomicI64::new(1),
            available: AtomicBool::new(true),
            fail_after: Mutex::new(None),
        }
    }

    /// Convenience constructor for service wiring
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Simulate losing/regaining the store connection
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Abort the next write batch after `n` ops have been staged
    ///
    /// One-shot knob for exercising mid-transaction rollback.
    pub fn fail_after_ops(&self, n: usize) {
        *self.fail_after.lock() = Some(n);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            return Ok(());
        }
        Err(StoreError::Unavailable(
            "memory store marked unavailable".into(),
        ))
    }
}

#[async_trait]
impl BackingStore for MemoryStore {
    async fn next_id(&self, sequence: IdSequence) -> StoreResult<i64> {
        self.check_available()?;
        let seq = match sequence {
            IdSequence::Product => &self.product_seq,
            IdSequence::Order => &self.order_seq,
        };
        Ok(seq.fetch_add(1, Ordering::SeqCst))
    }

    async fn get_account(&self, username: &str) -> StoreResult<Option<Account>> {
        self.check_available()?;
        Ok(self.tables.read().accounts.get(username).cloned())
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        self.check_available()?;
        let mut accounts: Vec<Account> = self.tables.read().accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(accounts)
    }

    async fn get_product(&self, id: i64) -> StoreResult<Option<Product>> {
        self.check_available()?;
        Ok(self.tables.read().products.get(&id).cloned())
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        self.check_available()?;
        Ok(self.tables.read().products.values().cloned().collect())
    }

    async fn get_order(&self, id: i64) -> StoreResult<Option<Order>> {
        self.check_available()?;
        Ok(self.tables.read().orders.get(&id).cloned())
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        self.check_available()?;
        Ok(self.tables.read().orders.values().cloned().collect())
    }

    async fn apply(&self, batch: WriteBatch) -> StoreResult<()> {
        self.check_available()?;
        let fail_after = self.fail_after.lock().take();

        let mut tables = self.tables.write();
        let mut staged = tables.clone();
        for (index, op) in batch.iter().enumerate() {
            if let Some(n) = fail_after
                && index >= n
            {
                return Err(StoreError::Backend(format!(
                    "injected fault after {} ops",
                    n
                )));
            }
            staged.apply_op(op)?;
        }
        *tables = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::{OrderItem, OrderStatus, Role};

    fn test_account(username: &str) -> Account {
        Account {
            username: username.into(),
            secret: "pw".into(),
            role: Role::Customer,
            display_name: username.into(),
            is_protected: false,
            created_at: 0,
        }
    }

    fn test_product(id: i64, stock: i64) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            price: Decimal::new(1000, 2),
            stock,
            category: "General".into(),
            description: String::new(),
            is_auction: false,
            current_bid: None,
            leading_bidder: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn test_order(id: i64) -> Order {
        Order {
            id,
            account: "alice".into(),
            created_at: 0,
            status: OrderStatus::Processing,
            items: vec![OrderItem {
                product_id: 1,
                name: "Product 1".into(),
                quantity: 1,
                unit_price: Decimal::new(1000, 2),
            }],
        }
    }

    #[tokio::test]
    async fn test_sequences_are_monotonic() {
        let store = MemoryStore::new();
        assert_eq!(store.next_id(IdSequence::Product).await.unwrap(), 1);
        assert_eq!(store.next_id(IdSequence::Product).await.unwrap(), 2);
        assert_eq!(store.next_id(IdSequence::Order).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryStore::new();
        store
            .apply(vec![WriteOp::InsertAccount(test_account("alice"))])
            .await
            .unwrap();
        assert!(store.get_account("alice").await.unwrap().is_some());
        assert!(store.get_account("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_violates_constraint() {
        let store = MemoryStore::new();
        store
            .apply(vec![WriteOp::InsertAccount(test_account("alice"))])
            .await
            .unwrap();
        let err = store
            .apply(vec![WriteOp::InsertAccount(test_account("alice"))])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_update_of_missing_row_fails_whole_batch() {
        let store = MemoryStore::new();
        let err = store
            .apply(vec![
                WriteOp::InsertProduct(test_product(1, 5)),
                WriteOp::UpdateProduct(test_product(2, 5)),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
        // First op must not have landed
        assert!(store.get_product(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_injected_fault_rolls_back_everything() {
        let store = MemoryStore::new();
        store
            .apply(vec![WriteOp::InsertProduct(test_product(1, 5))])
            .await
            .unwrap();

        store.fail_after_ops(2);
        let err = store
            .apply(vec![
                WriteOp::UpdateProduct(test_product(1, 0)),
                WriteOp::InsertOrder(test_order(1)),
                WriteOp::InsertOrder(test_order(2)),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));

        // Pre-batch state is fully intact
        assert_eq!(store.get_product(1).await.unwrap().unwrap().stock, 5);
        assert!(store.get_order(1).await.unwrap().is_none());
        assert!(store.get_order(2).await.unwrap().is_none());

        // The knob is one-shot; the retried batch lands
        store
            .apply(vec![
                WriteOp::UpdateProduct(test_product(1, 0)),
                WriteOp::InsertOrder(test_order(1)),
                WriteOp::InsertOrder(test_order(2)),
            ])
            .await
            .unwrap();
        assert_eq!(store.get_product(1).await.unwrap().unwrap().stock, 0);
        assert!(store.get_order(2).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unavailable_store_returns_typed_error() {
        let store = MemoryStore::new();
        store.set_available(false);
        let err = store.get_product(1).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        store.set_available(true);
        assert!(store.get_product(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_products_sorted_by_id() {
        let store = MemoryStore::new();
        store
            .apply(vec![
                WriteOp::InsertProduct(test_product(3, 1)),
                WriteOp::InsertProduct(test_product(1, 1)),
                WriteOp::InsertProduct(test_product(2, 1)),
            ])
            .await
            .unwrap();
        let ids: Vec<i64> = store
            .list_products()
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
