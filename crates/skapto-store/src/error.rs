//! Storage errors

use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Schema migration failed
    #[error("migration error: {0}")]
    Migration(String),

    /// Store is not writable
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for storage operations
pub type StoreResult<T> = Result<T, StoreError>;
