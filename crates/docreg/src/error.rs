//! Error types for the registry facade.

use docreg_core::{CoreError, RegistryError};
use docreg_perms::PermsError;
use docreg_store::StoreError;
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The call violated a registry precondition. Nothing changed.
    #[error("rejected: {0}")]
    Rejected(#[from] RegistryError),

    /// Storage error. Nothing changed.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Persisted access-control state is unusable.
    #[error("permission error: {0}")]
    Permission(#[from] PermsError),

    /// A signed call did not verify against its caller key.
    #[error("invalid signature")]
    InvalidSignature,

    /// A signed call carried a stale or out-of-order nonce.
    #[error("invalid nonce: expected {expected}, got {got}")]
    InvalidNonce { expected: u64, got: u64 },

    /// Encoding error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// The task running the call panicked.
    #[error("call task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    /// The registry precondition that failed, if this is a rejection.
    pub fn rejection(&self) -> Option<&RegistryError> {
        match self {
            Error::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, Error>;
