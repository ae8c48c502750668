//! Database connection pool

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Database connection pool type alias
pub type DbPool = SqlitePool;

/// Pool tuning options
#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Maximum open connections
    pub max_connections: u32,
    /// Create the database file when it does not exist
    pub create_if_missing: bool,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_connections: 4,
            create_if_missing: true,
        }
    }
}

/// Create a new database connection pool
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    create_pool_with_options(database_url, PoolOptions::default()).await
}

/// Create a connection pool with explicit options.
///
/// In-memory databases are private to a connection, so they are always
/// opened with a single connection.
pub async fn create_pool_with_options(
    database_url: &str,
    options: PoolOptions,
) -> Result<DbPool, sqlx::Error> {
    let connect = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(options.create_if_missing);

    if database_url.contains(":memory:") {
        // Closing the last connection drops the database
        return SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect)
            .await;
    }

    SqlitePoolOptions::new()
        .max_connections(options.max_connections)
        .connect_with(connect)
        .await
}
