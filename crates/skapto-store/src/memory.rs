//! In-memory key-value store

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::{StoreError, StoreResult};
use crate::repo::KeyValueStore;

/// Process-local flag store.
///
/// Nothing survives the process; use it for tests and ephemeral sessions.
/// Writes can be switched off to exercise storage failures.
#[derive(Default, Clone)]
pub struct MemoryKeyValueStore {
    flags: Arc<DashMap<String, bool>>,
    read_only: Arc<AtomicBool>,
}

impl MemoryKeyValueStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every subsequent write with [`StoreError::Unavailable`]
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_flag(&self, key: &str) -> StoreResult<Option<bool>> {
        Ok(self.flags.get(key).map(|v| *v.value()))
    }

    async fn set_flag(&self, key: &str, value: bool) -> StoreResult<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is read-only".to_string()));
        }
        self.flags.insert(key.to_string(), value);
        Ok(())
    }

    async fn flagged_keys(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .flags
            .iter()
            .filter(|e| *e.value() && e.key().starts_with(prefix))
            .map(|e| e.key().clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

impl std::fmt::Debug for MemoryKeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryKeyValueStore")
            .field("len", &self.flags.len())
            .finish_non_exhaustive()
    }
}
