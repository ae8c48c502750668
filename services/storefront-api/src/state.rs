//! Application state for the Storefront API service.

use std::sync::Arc;

use skapto_access::StorefrontService;
use skapto_commerce::RevenueCatProvider;
use skapto_store::{PassLedger, SqliteKeyValueStore};

use crate::config::Config;

/// Storefront service as wired in production
pub type Storefront = StorefrontService<RevenueCatProvider, PassLedger<SqliteKeyValueStore>>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Storefront service (subscription, purchases, bookings)
    pub storefront: Arc<Storefront>,
    /// Ledger store (for readiness checks)
    pub store: Arc<SqliteKeyValueStore>,
    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(storefront: Storefront, store: Arc<SqliteKeyValueStore>, config: Config) -> Self {
        Self {
            storefront: Arc::new(storefront),
            store,
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
