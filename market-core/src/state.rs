//! Core state wiring
//!
//! One backing store and one product-lock registry, shared by every service
//! so all stock/bid mutation serializes on the same locks.

use crate::auth::Session;
use crate::config::CoreConfig;
use crate::db::{BackingStore, LockRegistry, MemoryStore};
use crate::orders::OrderEngine;
use crate::services::{AuctionService, CatalogService, IdentityService};
use shared::error::AppResult;
use std::sync::Arc;

/// The wired transaction core handed to the presentation layer
#[derive(Clone, Debug)]
pub struct CoreState {
    pub config: CoreConfig,
    store: Arc<dyn BackingStore>,
    pub identity: IdentityService,
    pub catalog: CatalogService,
    pub orders: OrderEngine,
    pub auction: AuctionService,
}

impl CoreState {
    /// Initialize against the in-memory reference store
    pub async fn initialize(config: CoreConfig) -> AppResult<Self> {
        Self::with_store(config, MemoryStore::shared()).await
    }

    /// Initialize against any backing store
    pub async fn with_store(
        config: CoreConfig,
        store: Arc<dyn BackingStore>,
    ) -> AppResult<Self> {
        let locks = LockRegistry::new();
        let timeout = config.store_timeout();

        let identity = IdentityService::new(store.clone(), timeout);
        let catalog = CatalogService::new(store.clone(), locks.clone(), timeout);
        let orders = OrderEngine::new(store.clone(), locks.clone(), timeout);
        let auction = AuctionService::new(store.clone(), locks, timeout);

        if config.seed_default_accounts {
            identity.seed_defaults().await?;
        }
        tracing::info!(environment = %config.environment, "Core initialized");

        Ok(Self {
            config,
            store,
            identity,
            catalog,
            orders,
            auction,
        })
    }

    /// Authenticate and open a session owning a fresh cart
    pub async fn login(&self, username: &str, secret: &str) -> AppResult<Session> {
        let account = self.identity.authenticate(username, secret).await?;
        Ok(Session::new(account))
    }

    pub fn store(&self) -> Arc<dyn BackingStore> {
        self.store.clone()
    }
}
