//! SQLite key-value store implementation

use async_trait::async_trait;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::pool::{create_pool, DbPool};
use crate::repo::KeyValueStore;

const CREATE_FLAGS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS kv_flags (
        key   TEXT PRIMARY KEY NOT NULL,
        value INTEGER NOT NULL
    )
"#;

/// SQLite-backed flag store
#[derive(Clone)]
pub struct SqliteKeyValueStore {
    pool: DbPool,
}

impl SqliteKeyValueStore {
    /// Wrap an existing pool and make sure the schema exists
    pub async fn new(pool: DbPool) -> StoreResult<Self> {
        sqlx::query(CREATE_FLAGS_TABLE)
            .execute(&pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Open the database at `database_url` (e.g. `sqlite://ledger.db`)
    pub async fn open(database_url: &str) -> StoreResult<Self> {
        debug!(database_url = %database_url, "Opening key-value store");
        let pool = create_pool(database_url).await?;
        Self::new(pool).await
    }

    /// Underlying pool
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get_flag(&self, key: &str) -> StoreResult<Option<bool>> {
        let value = sqlx::query_scalar::<_, i64>("SELECT value FROM kv_flags WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value.map(|v| v != 0))
    }

    async fn set_flag(&self, key: &str, value: bool) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_flags (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(i64::from(value))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn flagged_keys(&self, prefix: &str) -> StoreResult<Vec<String>> {
        // substr instead of LIKE: '_' in prefixes is a LIKE wildcard
        let keys = sqlx::query_scalar::<_, String>(
            r#"
            SELECT key FROM kv_flags
            WHERE substr(key, 1, length(?1)) = ?1 AND value != 0
            ORDER BY key
            "#,
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;

        Ok(keys)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

impl std::fmt::Debug for SqliteKeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteKeyValueStore").finish_non_exhaustive()
    }
}
