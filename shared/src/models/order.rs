//! Order Model
//!
//! Orders are created only by the order engine's atomic commit and are
//! immutable afterwards except for the status field. Line items snapshot
//! the product name and unit price at commit time so later catalog edits
//! never alter order history.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Check whether a transition to `next` is allowed
    ///
    /// Valid transitions: Processing -> Shipped | Cancelled,
    /// Shipped -> Delivered. Delivered and Cancelled are terminal.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Processing, OrderStatus::Shipped)
                | (OrderStatus::Processing, OrderStatus::Cancelled)
                | (OrderStatus::Shipped, OrderStatus::Delivered)
        )
    }

    /// Check if this status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

/// One committed line of an order
///
/// `name` and `unit_price` are copies frozen at commit time, not references
/// into the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl OrderItem {
    /// Line subtotal: quantity x snapshotted unit price
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Assigned by the backing store on commit, immutable afterwards
    pub id: i64,
    /// Owning account username
    pub account: String,
    /// Commit timestamp (epoch millis)
    pub created_at: i64,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Order total, derived from line subtotals (never stored)
    pub fn total(&self) -> Decimal {
        self.items.iter().map(OrderItem::subtotal).sum()
    }
}
