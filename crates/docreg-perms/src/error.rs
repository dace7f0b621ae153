//! Error types for the permissions module.

use thiserror::Error;

/// Errors raised when rebuilding access-control state.
///
/// Rejected membership calls are reported as
/// [`RegistryError`](docreg_core::RegistryError), not here.
#[derive(Debug, Error)]
pub enum PermsError {
    /// A persisted verifier set was empty.
    #[error("verifier set is empty")]
    EmptyVerifierSet,
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;
