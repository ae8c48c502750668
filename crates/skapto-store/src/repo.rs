//! Repository traits
//!
//! Async key-value interface the consumption ledger persists through.

use async_trait::async_trait;

use crate::error::StoreResult;

/// Boolean flag store scoped to one installation
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a flag
    async fn get_flag(&self, key: &str) -> StoreResult<Option<bool>>;

    /// Write a flag (insert or overwrite)
    async fn set_flag(&self, key: &str, value: bool) -> StoreResult<()>;

    /// Keys with the given prefix whose flag is `true`
    async fn flagged_keys(&self, prefix: &str) -> StoreResult<Vec<String>>;

    /// Check the store is reachable
    async fn ping(&self) -> StoreResult<()>;
}
