//! Error types for the registry core.

use thiserror::Error;

use crate::crypto::Identity;
use crate::types::Fingerprint;

/// Low-level errors from signing and encoding.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("encoding error: {0}")]
    EncodingError(String),
}

/// A rejected registry operation.
///
/// Each variant names exactly one violated precondition. A rejected call has
/// changed nothing and may be retried with corrected input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("document hash is empty")]
    EmptyHash,

    #[error("document {0} is already registered")]
    DocumentAlreadyRegistered(Fingerprint),

    #[error("document {0} does not exist")]
    DocumentDoesNotExist(Fingerprint),

    #[error("only the document owner can request verification")]
    OnlyOwnerCanRequest,

    #[error("caller is not an authorized verifier")]
    NotAuthorizedVerifier,

    #[error("verification already completed")]
    VerificationCompleted,

    #[error("a rejection requires a reason")]
    RejectionReasonRequired,

    #[error("{0} is already a verifier")]
    AlreadyVerifier(Identity),

    #[error("{0} is not a verifier")]
    NotVerifier(Identity),

    #[error("cannot remove the last verifier")]
    CannotRemoveLastVerifier,

    #[error("caller is not the administrator")]
    NotAuthorized,
}
