//! OrderEngine - atomic commit and status transitions
//!
//! # Commit Flow
//!
//! ```text
//! commit(cart, account)
//!     ├─ 1. Reject empty cart
//!     ├─ 2. Acquire per-product locks, ascending by id
//!     ├─ 3. Validate stock for every line (no writes yet)
//!     ├─ 4. Snapshot name/price into order items
//!     ├─ 5. Apply one transactional batch:
//!     │      stock decrements + order insert
//!     └─ 6. Release locks, return the order
//! ```
//!
//! A failed validation in step 3 leaves the store untouched; a store fault
//! in step 5 rolls back inside the transactional boundary. Partial orders
//! are never observable.

use crate::auth::{Permission, authorize};
use crate::db::{BackingStore, IdSequence, LockRegistry, WriteOp, with_timeout};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Account, Cart, Order, OrderItem, OrderStatus, Product, Role};
use std::sync::Arc;
use std::time::Duration;

/// Cart-to-order conversion and order lifecycle
#[derive(Clone)]
pub struct OrderEngine {
    store: Arc<dyn BackingStore>,
    /// Product registry shared with catalog and auction
    product_locks: LockRegistry,
    /// Engine-owned registry serializing status transitions per order
    order_locks: LockRegistry,
    timeout: Duration,
}

impl std::fmt::Debug for OrderEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderEngine")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OrderEngine {
    pub fn new(store: Arc<dyn BackingStore>, product_locks: LockRegistry, timeout: Duration) -> Self {
        Self {
            store,
            product_locks,
            order_locks: LockRegistry::new(),
            timeout,
        }
    }

    /// Commit a cart as a persisted order, decrementing stock atomically
    pub async fn commit(&self, cart: &Cart, account: &Account) -> AppResult<Order> {
        if cart.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }

        // Ascending acquisition keeps overlapping commits deadlock-free
        let _guards = self.product_locks.lock_many(&cart.product_ids()).await;

        // Validate everything before writing anything
        let mut items = Vec::with_capacity(cart.len());
        let mut decrements: Vec<Product> = Vec::with_capacity(cart.len());
        for line in cart.lines() {
            let mut product = self.fetch_product(line.product_id).await?;
            if product.stock < line.quantity {
                tracing::debug!(
                    product_id = product.id,
                    stock = product.stock,
                    requested = line.quantity,
                    "Commit rejected, insufficient stock"
                );
                return Err(AppError::insufficient_stock(product.id)
                    .with_detail("stock", product.stock)
                    .with_detail("requested", line.quantity));
            }
            items.push(OrderItem {
                product_id: product.id,
                name: product.name.clone(),
                quantity: line.quantity,
                unit_price: product.price,
            });
            product.stock -= line.quantity;
            product.updated_at = chrono::Utc::now().timestamp_millis();
            decrements.push(product);
        }

        let order_id = with_timeout(self.timeout, self.store.next_id(IdSequence::Order)).await?;
        let order = Order {
            id: order_id,
            account: account.username.clone(),
            created_at: chrono::Utc::now().timestamp_millis(),
            status: OrderStatus::Processing,
            items,
        };

        let mut batch: Vec<WriteOp> = decrements.into_iter().map(WriteOp::UpdateProduct).collect();
        batch.push(WriteOp::InsertOrder(order.clone()));
        with_timeout(self.timeout, self.store.apply(batch)).await?;

        tracing::info!(
            order_id,
            account = %account.username,
            lines = order.items.len(),
            total = %order.total(),
            "Order committed"
        );
        Ok(order)
    }

    /// Transition an order's status
    ///
    /// Manager/admin only. Cancelling a Processing order restores the
    /// reserved stock in the same transactional batch.
    pub async fn update_status(
        &self,
        actor: &Account,
        order_id: i64,
        new_status: OrderStatus,
    ) -> AppResult<Order> {
        authorize(actor.role, Permission::ManageOrders)?;

        // Serialize transitions per order; two racing cancels must not both
        // restore stock
        let _order_guard = self.order_locks.lock(order_id).await;

        let mut order = self.fetch_order(order_id).await?;
        if !order.status.can_transition_to(new_status) {
            return Err(AppError::new(ErrorCode::InvalidStatusTransition)
                .with_detail("order_id", order_id)
                .with_detail("from", format!("{:?}", order.status))
                .with_detail("to", format!("{:?}", new_status)));
        }

        let previous = order.status;
        order.status = new_status;

        if new_status == OrderStatus::Cancelled {
            // Restore the reserved stock in the same batch as the status flip
            let ids: Vec<i64> = order.items.iter().map(|i| i.product_id).collect();
            let _guards = self.product_locks.lock_many(&ids).await;

            let mut batch = Vec::with_capacity(order.items.len() + 1);
            for item in &order.items {
                let mut product = self.fetch_product(item.product_id).await?;
                product.stock += item.quantity;
                product.updated_at = chrono::Utc::now().timestamp_millis();
                batch.push(WriteOp::UpdateProduct(product));
            }
            batch.push(WriteOp::UpdateOrder(order.clone()));
            with_timeout(self.timeout, self.store.apply(batch)).await?;
        } else {
            with_timeout(
                self.timeout,
                self.store.apply(vec![WriteOp::UpdateOrder(order.clone())]),
            )
            .await?;
        }

        tracing::info!(
            order_id,
            from = ?previous,
            to = ?new_status,
            actor = %actor.username,
            "Order status updated"
        );
        Ok(order)
    }

    /// Order history for one account, ascending by id
    pub async fn list_for_account(&self, username: &str) -> AppResult<Vec<Order>> {
        let orders = with_timeout(self.timeout, self.store.list_orders()).await?;
        Ok(orders.into_iter().filter(|o| o.account == username).collect())
    }

    /// All orders (manager/admin only)
    pub async fn list_all(&self, actor_role: Role) -> AppResult<Vec<Order>> {
        authorize(actor_role, Permission::ManageOrders)?;
        with_timeout(self.timeout, self.store.list_orders())
            .await
            .map_err(Into::into)
    }

    /// One order, visible to its owner and to order managers
    pub async fn get_order(&self, actor: &Account, order_id: i64) -> AppResult<Order> {
        let order = self.fetch_order(order_id).await?;
        if order.account != actor.username {
            authorize(actor.role, Permission::ManageOrders)?;
        }
        Ok(order)
    }

    async fn fetch_product(&self, id: i64) -> AppResult<Product> {
        with_timeout(self.timeout, self.store.get_product(id))
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", id))
    }

    async fn fetch_order(&self, id: i64) -> AppResult<Order> {
        with_timeout(self.timeout, self.store.get_order(id))
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", id))
    }
}
