//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product entity
///
/// `current_bid` and `leading_bidder` are only present when `is_auction` is
/// set; both are mutated exclusively through the auction engine under the
/// product's lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Assigned by the backing store on creation, immutable afterwards
    pub id: i64,
    pub name: String,
    /// Unit price, non-negative
    pub price: Decimal,
    /// Units on hand, non-negative; decremented only by order commit
    pub stock: i64,
    pub category: String,
    pub description: String,
    pub is_auction: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_bid: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leading_bidder: Option<String>,
    /// Creation timestamp (epoch millis)
    pub created_at: i64,
    /// Last update timestamp (epoch millis)
    pub updated_at: i64,
}

impl Product {
    /// Derive the auction view of this product, if it is auction-listed
    pub fn auction_state(&self) -> Option<AuctionState> {
        if !self.is_auction {
            return None;
        }
        Some(AuctionState {
            product_id: self.id,
            current_bid: self.current_bid.unwrap_or(self.price),
            leading_bidder: self.leading_bidder.clone(),
        })
    }
}

/// Auction view derived from an auction-listed product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionState {
    pub product_id: i64,
    pub current_bid: Decimal,
    pub leading_bidder: Option<String>,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: Decimal,
    pub stock: i64,
    pub category: String,
    pub description: String,
    pub is_auction: bool,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Catalog listing filter
///
/// All criteria are conjunctive; an empty filter matches every product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    /// Case-insensitive substring match on the product name
    pub name_contains: Option<String>,
    #[serde(default)]
    pub auction_only: bool,
}

impl ProductFilter {
    /// Check whether a product passes this filter
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category
            && &product.category != category
        {
            return false;
        }
        if let Some(needle) = &self.name_contains
            && !product
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase())
        {
            return false;
        }
        if self.auction_only && !product.is_auction {
            return false;
        }
        true
    }
}
