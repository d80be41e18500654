//! Auction Service - strict-increase bid protocol
//!
//! Bids mutate the product's current bid under the same per-product lock the
//! order engine uses for stock, so a product is never bid on and
//! stock-adjusted inconsistently. Accepted bids are broadcast on a channel;
//! bid history and auction close can subscribe there without touching the
//! acceptance path.

use crate::db::{BackingStore, LockRegistry, WriteOp, with_timeout};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Account, AuctionState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Event broadcast channel capacity
const BID_CHANNEL_CAPACITY: usize = 1024;

/// An accepted bid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidEvent {
    pub product_id: i64,
    pub bidder: String,
    pub amount: Decimal,
    /// Acceptance timestamp (epoch millis)
    pub timestamp: i64,
}

/// Bid validation and current-bid state
#[derive(Clone)]
pub struct AuctionService {
    store: Arc<dyn BackingStore>,
    locks: LockRegistry,
    timeout: Duration,
    event_tx: broadcast::Sender<BidEvent>,
}

impl std::fmt::Debug for AuctionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuctionService")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AuctionService {
    pub fn new(store: Arc<dyn BackingStore>, locks: LockRegistry, timeout: Duration) -> Self {
        let (event_tx, _) = broadcast::channel(BID_CHANNEL_CAPACITY);
        Self {
            store,
            locks,
            timeout,
            event_tx,
        }
    }

    /// Subscribe to accepted bids
    pub fn subscribe(&self) -> broadcast::Receiver<BidEvent> {
        self.event_tx.subscribe()
    }

    /// Place a bid on an auction-listed product
    ///
    /// The bid must strictly exceed the current bid; ties are rejected. The
    /// listed price is the opening bid, so the first accepted bid must
    /// exceed it.
    pub async fn place_bid(
        &self,
        product_id: i64,
        bidder: &Account,
        amount: Decimal,
    ) -> AppResult<AuctionState> {
        let _guard = self.locks.lock(product_id).await;

        let mut product = with_timeout(self.timeout, self.store.get_product(product_id))
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", product_id)
            })?;
        if !product.is_auction {
            return Err(
                AppError::new(ErrorCode::NotAuctionItem).with_detail("product_id", product_id)
            );
        }

        let current = product.current_bid.unwrap_or(product.price);
        if amount <= current {
            tracing::debug!(
                product_id,
                bidder = %bidder.username,
                amount = %amount,
                current = %current,
                "Bid rejected"
            );
            return Err(AppError::bid_too_low(product_id)
                .with_detail("amount", amount.to_string())
                .with_detail("current_bid", current.to_string()));
        }

        product.current_bid = Some(amount);
        product.leading_bidder = Some(bidder.username.clone());
        product.updated_at = chrono::Utc::now().timestamp_millis();
        with_timeout(
            self.timeout,
            self.store.apply(vec![WriteOp::UpdateProduct(product)]),
        )
        .await?;

        let state = AuctionState {
            product_id,
            current_bid: amount,
            leading_bidder: Some(bidder.username.clone()),
        };
        tracing::info!(product_id, bidder = %bidder.username, amount = %amount, "Bid accepted");

        // No receivers is fine; the channel is an extension seam
        let _ = self.event_tx.send(BidEvent {
            product_id,
            bidder: bidder.username.clone(),
            amount,
            timestamp: chrono::Utc::now().timestamp_millis(),
        });

        Ok(state)
    }

    /// Current auction view of a product
    pub async fn auction_state(&self, product_id: i64) -> AppResult<AuctionState> {
        let product = with_timeout(self.timeout, self.store.get_product(product_id))
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", product_id)
            })?;
        product.auction_state().ok_or_else(|| {
            AppError::new(ErrorCode::NotAuctionItem).with_detail("product_id", product_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{IdSequence, MemoryStore};
    use shared::models::{Product, Role};

    async fn setup(is_auction: bool, price: Decimal) -> (AuctionService, i64) {
        let store = MemoryStore::shared();
        let id = store.next_id(IdSequence::Product).await.unwrap();
        let product = Product {
            id,
            name: "Vintage Lamp".into(),
            price,
            stock: 1,
            category: "Home & Garden".into(),
            description: String::new(),
            is_auction,
            current_bid: is_auction.then_some(price),
            leading_bidder: None,
            created_at: 0,
            updated_at: 0,
        };
        store
            .apply(vec![WriteOp::InsertProduct(product)])
            .await
            .unwrap();
        let auction = AuctionService::new(store, LockRegistry::new(), Duration::from_secs(1));
        (auction, id)
    }

    fn bidder(username: &str) -> Account {
        Account {
            username: username.into(),
            secret: "pw".into(),
            role: Role::Customer,
            display_name: username.into(),
            is_protected: false,
            created_at: 0,
        }
    }

    #[tokio::test]
    async fn test_tie_rejected_strict_increase_accepted() {
        let (auction, id) = setup(true, Decimal::new(10000, 2)).await;
        let alice = bidder("alice");

        let err = auction
            .place_bid(id, &alice, Decimal::new(10000, 2))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BidTooLow);

        let state = auction
            .place_bid(id, &alice, Decimal::new(10001, 2))
            .await
            .unwrap();
        assert_eq!(state.current_bid, Decimal::new(10001, 2));
        assert_eq!(state.leading_bidder.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_lower_bid_rejected_and_state_unchanged() {
        let (auction, id) = setup(true, Decimal::new(5000, 2)).await;
        let alice = bidder("alice");
        let bob = bidder("bob");

        auction
            .place_bid(id, &alice, Decimal::new(6000, 2))
            .await
            .unwrap();
        let err = auction
            .place_bid(id, &bob, Decimal::new(5500, 2))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BidTooLow);

        let state = auction.auction_state(id).await.unwrap();
        assert_eq!(state.current_bid, Decimal::new(6000, 2));
        assert_eq!(state.leading_bidder.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_accepted_bids_strictly_increase() {
        let (auction, id) = setup(true, Decimal::new(1000, 2)).await;
        let alice = bidder("alice");

        let mut last = Decimal::new(1000, 2);
        for amount in [
            Decimal::new(1001, 2),
            Decimal::new(1050, 2),
            Decimal::new(2000, 2),
        ] {
            let state = auction.place_bid(id, &alice, amount).await.unwrap();
            assert!(state.current_bid > last);
            last = state.current_bid;
        }
    }

    #[tokio::test]
    async fn test_non_auction_product_rejected() {
        let (auction, id) = setup(false, Decimal::new(1000, 2)).await;
        let err = auction
            .place_bid(id, &bidder("alice"), Decimal::new(2000, 2))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuctionItem);
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let (auction, _) = setup(true, Decimal::new(1000, 2)).await;
        let err = auction
            .place_bid(999, &bidder("alice"), Decimal::new(2000, 2))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductNotFound);
    }

    #[tokio::test]
    async fn test_accepted_bid_is_broadcast() {
        let (auction, id) = setup(true, Decimal::new(1000, 2)).await;
        let mut events = auction.subscribe();

        auction
            .place_bid(id, &bidder("alice"), Decimal::new(1500, 2))
            .await
            .unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(event.product_id, id);
        assert_eq!(event.bidder, "alice");
        assert_eq!(event.amount, Decimal::new(1500, 2));
    }
}
