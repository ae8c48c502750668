//! Skapto Store - Local persistence
//!
//! Installation-scoped storage for the pass consumption ledger, backed by
//! SQLite (sqlx) or an in-memory map.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use skapto_store::{ConsumptionLedger, PassLedger, SqliteKeyValueStore};
//!
//! let store = SqliteKeyValueStore::open("sqlite://ledger.db").await?;
//! let ledger = PassLedger::open(Arc::new(store)).await?;
//!
//! ledger.mark_consumed(&"tx-1".into()).await?;
//! assert!(ledger.has(&"tx-1".into()));
//! ```

pub mod error;
pub mod ledger;
pub mod memory;
pub mod pool;
pub mod repo;
pub mod sqlite;

pub use error::{StoreError, StoreResult};
pub use ledger::{consumed_key, ConsumptionLedger, PassLedger, CONSUMED_KEY_PREFIX};
pub use memory::MemoryKeyValueStore;
pub use pool::{create_pool, create_pool_with_options, DbPool, PoolOptions};
pub use repo::KeyValueStore;
pub use sqlite::SqliteKeyValueStore;
