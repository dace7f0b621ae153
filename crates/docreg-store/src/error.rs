//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// CBOR encoding or decoding of a stored blob failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Stored data is malformed, or a commit does not fit the stored state.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A thread panicked while holding the store lock.
    #[error("store lock poisoned: {0}")]
    LockPoisoned(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// `initialize` was called on a store that already holds a registry.
    #[error("store already holds an initialized registry")]
    AlreadyInitialized,

    /// The store holds no registry yet.
    #[error("store has not been initialized")]
    NotInitialized,
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
