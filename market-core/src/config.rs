//! Core configuration

use std::time::Duration;

/// Configuration for the transaction core
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Time budget for a single backing-store operation
    pub store_timeout_ms: u64,
    /// Create the protected admin/manager accounts on startup
    pub seed_default_accounts: bool,
    pub environment: String,
}

impl CoreConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self {
            store_timeout_ms: std::env::var("STORE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            seed_default_accounts: std::env::var("SEED_DEFAULT_ACCOUNTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            store_timeout_ms: 5000,
            seed_default_accounts: true,
            environment: "development".into(),
        }
    }
}
