//! Notifications raised by successful calls.

use serde::{Deserialize, Serialize};

use crate::crypto::Identity;
use crate::record::VerificationStatus;
use crate::types::Fingerprint;

/// A notification describing one applied call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    DocumentRegistered {
        fingerprint: Fingerprint,
        title: String,
        owner: Identity,
    },
    VerificationRequested {
        fingerprint: Fingerprint,
        owner: Identity,
    },
    DocumentVerified {
        fingerprint: Fingerprint,
        status: VerificationStatus,
        verifier: Identity,
        reason: String,
    },
    VerifierAdded {
        verifier: Identity,
    },
    VerifierRemoved {
        verifier: Identity,
    },
}

impl Event {
    /// Stable name, used as the event kind in storage.
    pub fn name(&self) -> &'static str {
        match self {
            Event::DocumentRegistered { .. } => "DocumentRegistered",
            Event::VerificationRequested { .. } => "VerificationRequested",
            Event::DocumentVerified { .. } => "DocumentVerified",
            Event::VerifierAdded { .. } => "VerifierAdded",
            Event::VerifierRemoved { .. } => "VerifierRemoved",
        }
    }

    /// The document this event concerns, if any.
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match self {
            Event::DocumentRegistered { fingerprint, .. }
            | Event::VerificationRequested { fingerprint, .. }
            | Event::DocumentVerified { fingerprint, .. } => Some(fingerprint),
            Event::VerifierAdded { .. } | Event::VerifierRemoved { .. } => None,
        }
    }
}

/// An event as recorded in the append-only event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// Position in the log, starting at 1.
    pub seq: u64,

    /// Time of the call that raised it (Unix milliseconds).
    pub at: i64,

    pub event: Event,
}
