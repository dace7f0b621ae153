//! Document records and their verification status.

use serde::{Deserialize, Serialize};

use crate::crypto::Identity;
use crate::types::Fingerprint;

/// Verification status of a document.
///
/// `Pending` is the only non-terminal state. A record moves from `Pending`
/// to `Approved` or `Rejected` at most once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum VerificationStatus {
    #[default]
    Pending = 0,
    Approved = 1,
    Rejected = 2,
}

impl VerificationStatus {
    /// Convert to u8 for storage.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Try to parse from u8.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Pending),
            1 => Some(Self::Approved),
            2 => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Whether no further transition is permitted.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// The terminal status for a decision.
    pub fn decided(approve: bool) -> Self {
        if approve {
            Self::Approved
        } else {
            Self::Rejected
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

/// The persisted state for one registered document.
///
/// Reads of an unregistered hash return [`DocumentRecord::absent`] rather
/// than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Canonical key. Immutable once created.
    pub fingerprint: Fingerprint,

    /// The hash string as submitted by the owner.
    pub hash: String,

    /// Free-text title.
    pub title: String,

    /// Identity that registered the document.
    pub owner: Identity,

    /// Registration time (Unix milliseconds).
    pub registered_at: i64,

    /// Current verification status.
    pub status: VerificationStatus,

    /// Identities that rendered a decision, in order.
    pub verifiers: Vec<Identity>,

    /// Non-empty iff `status` is `Rejected`.
    pub rejection_reason: String,

    /// True iff the document was ever registered.
    pub exists: bool,
}

impl DocumentRecord {
    /// A freshly registered, pending record.
    pub fn new(
        fingerprint: Fingerprint,
        hash: impl Into<String>,
        title: impl Into<String>,
        owner: Identity,
        registered_at: i64,
    ) -> Self {
        Self {
            fingerprint,
            hash: hash.into(),
            title: title.into(),
            owner,
            registered_at,
            status: VerificationStatus::Pending,
            verifiers: Vec::new(),
            rejection_reason: String::new(),
            exists: true,
        }
    }

    /// The zero-valued record returned for unregistered hashes.
    pub fn absent() -> Self {
        Self {
            fingerprint: Fingerprint::ZERO,
            hash: String::new(),
            title: String::new(),
            owner: Identity::ZERO,
            registered_at: 0,
            status: VerificationStatus::Pending,
            verifiers: Vec::new(),
            rejection_reason: String::new(),
            exists: false,
        }
    }

    /// Whether a final decision has been recorded.
    pub fn is_decided(&self) -> bool {
        self.status.is_terminal()
    }

    /// The record after `verifier` decides. Does not check preconditions.
    pub(crate) fn decided_by(&self, verifier: Identity, approve: bool, reason: &str) -> Self {
        let mut next = self.clone();
        next.status = VerificationStatus::decided(approve);
        next.verifiers.push(verifier);
        if !approve {
            next.rejection_reason = reason.to_string();
        }
        next
    }
}

impl Default for DocumentRecord {
    fn default() -> Self {
        Self::absent()
    }
}
