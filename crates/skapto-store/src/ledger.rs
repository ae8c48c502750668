//! Pass consumption ledger
//!
//! Records which single-visit purchase transactions have been redeemed.
//! The commerce provider has no "consume" primitive for one-time products,
//! so the ledger keeps that fact locally, one flag per transaction under the
//! key `consumed_<transaction id>`.
//!
//! # Ordering
//!
//! Writes go to the backing store first and to the in-memory mirror only
//! after the store accepted them. A failed write therefore leaves the pass
//! unconsumed and is reported to the caller, and a successful
//! [`ConsumptionLedger::mark_consumed`] is visible to the next
//! [`ConsumptionLedger::has`] in program order.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashSet;
use skapto_types::TransactionId;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::error::StoreResult;
use crate::repo::KeyValueStore;

/// Key prefix of consumption flags
pub const CONSUMED_KEY_PREFIX: &str = "consumed_";

/// Storage key for a transaction's consumption flag
pub fn consumed_key(transaction_id: &TransactionId) -> String {
    format!("{CONSUMED_KEY_PREFIX}{transaction_id}")
}

/// Durable record of redeemed one-time transactions
#[async_trait]
pub trait ConsumptionLedger: Send + Sync {
    /// Whether the transaction has already been redeemed.
    ///
    /// Never performs I/O.
    fn has(&self, transaction_id: &TransactionId) -> bool;

    /// Mark the transaction redeemed. Marking twice is a no-op.
    async fn mark_consumed(&self, transaction_id: &TransactionId) -> StoreResult<()>;

    /// Atomically check and mark.
    ///
    /// Returns `true` if this call moved the transaction from unconsumed to
    /// consumed, `false` if it was already consumed.
    async fn try_consume(&self, transaction_id: &TransactionId) -> StoreResult<bool>;
}

/// Ledger persisted through a [`KeyValueStore`]
pub struct PassLedger<S: KeyValueStore> {
    store: Arc<S>,
    consumed: DashSet<TransactionId>,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> PassLedger<S> {
    /// Open the ledger, loading every consumed flag from the store
    pub async fn open(store: Arc<S>) -> StoreResult<Self> {
        let keys = store.flagged_keys(CONSUMED_KEY_PREFIX).await?;
        let consumed: DashSet<TransactionId> = keys
            .into_iter()
            .filter_map(|k| {
                k.strip_prefix(CONSUMED_KEY_PREFIX)
                    .map(TransactionId::from)
            })
            .collect();

        info!(consumed = consumed.len(), "Pass ledger opened");

        Ok(Self {
            store,
            consumed,
            write_lock: Mutex::new(()),
        })
    }

    /// Backing store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Number of consumed transactions
    pub fn len(&self) -> usize {
        self.consumed.len()
    }

    /// Whether nothing has been consumed yet
    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }

    /// Consumed transaction ids, sorted
    pub fn consumed_ids(&self) -> Vec<TransactionId> {
        let mut ids: Vec<TransactionId> = self.consumed.iter().map(|t| t.key().clone()).collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl<S: KeyValueStore> ConsumptionLedger for PassLedger<S> {
    fn has(&self, transaction_id: &TransactionId) -> bool {
        self.consumed.contains(transaction_id)
    }

    async fn mark_consumed(&self, transaction_id: &TransactionId) -> StoreResult<()> {
        self.try_consume(transaction_id).await.map(|_| ())
    }

    async fn try_consume(&self, transaction_id: &TransactionId) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;

        if self.consumed.contains(transaction_id) {
            debug!(transaction_id = %transaction_id, "Transaction already consumed");
            return Ok(false);
        }

        if let Err(e) = self.store.set_flag(&consumed_key(transaction_id), true).await {
            error!(transaction_id = %transaction_id, error = %e, "Failed to persist consumption");
            return Err(e);
        }

        self.consumed.insert(transaction_id.clone());
        info!(transaction_id = %transaction_id, "Transaction consumed");
        Ok(true)
    }
}

impl<S: KeyValueStore> std::fmt::Debug for PassLedger<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassLedger")
            .field("consumed", &self.consumed.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::memory::MemoryKeyValueStore;

    async fn ledger() -> (Arc<MemoryKeyValueStore>, PassLedger<MemoryKeyValueStore>) {
        let store = Arc::new(MemoryKeyValueStore::new());
        let ledger = PassLedger::open(Arc::clone(&store)).await.unwrap();
        (store, ledger)
    }

    #[test]
    fn test_consumed_key_layout() {
        assert_eq!(consumed_key(&TransactionId::from("tx-1")), "consumed_tx-1");
    }

    #[tokio::test]
    async fn test_mark_consumed_is_idempotent() {
        let (store, ledger) = ledger().await;
        let tx = TransactionId::from("tx-1");

        ledger.mark_consumed(&tx).await.unwrap();
        let after_once = (ledger.consumed_ids(), store.len());
        ledger.mark_consumed(&tx).await.unwrap();
        let after_twice = (ledger.consumed_ids(), store.len());

        assert_eq!(after_once, after_twice);
        assert!(ledger.has(&tx));
    }

    #[tokio::test]
    async fn test_try_consume_reports_transition() {
        let (_, ledger) = ledger().await;
        let tx = TransactionId::from("tx-1");

        assert!(ledger.try_consume(&tx).await.unwrap());
        assert!(!ledger.try_consume(&tx).await.unwrap());
    }

    #[tokio::test]
    async fn test_reopen_loads_consumed_flags() {
        let (store, ledger) = ledger().await;
        ledger.mark_consumed(&TransactionId::from("tx-1")).await.unwrap();
        ledger.mark_consumed(&TransactionId::from("tx-2")).await.unwrap();
        store.set_flag("unrelated", true).await.unwrap();
        drop(ledger);

        let reopened = PassLedger::open(store).await.unwrap();
        assert_eq!(
            reopened.consumed_ids(),
            vec![TransactionId::from("tx-1"), TransactionId::from("tx-2")]
        );
    }

    #[tokio::test]
    async fn test_failed_write_leaves_transaction_unconsumed() {
        let (store, ledger) = ledger().await;
        let tx = TransactionId::from("tx-1");
        store.set_read_only(true);

        let err = ledger.mark_consumed(&tx).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(!ledger.has(&tx));

        store.set_read_only(false);
        assert!(ledger.try_consume(&tx).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_try_consume_has_single_winner() {
        let (_, ledger) = ledger().await;
        let ledger = Arc::new(ledger);
        let tx = TransactionId::from("tx-race");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                let tx = tx.clone();
                tokio::spawn(async move { ledger.try_consume(&tx).await.unwrap() })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
