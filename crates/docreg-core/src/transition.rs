//! Planned state changes.
//!
//! A [`Transition`] is the validated outcome of a call, computed without
//! touching state. It is persisted first and applied to memory second.

use serde::{Deserialize, Serialize};

use crate::crypto::Identity;
use crate::event::Event;
use crate::record::DocumentRecord;

/// A single state mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    /// Create a new record. The fingerprint must be unused.
    InsertDocument(DocumentRecord),
    /// Replace an existing record after a decision.
    UpdateDocument(DocumentRecord),
    AddVerifier(Identity),
    RemoveVerifier(Identity),
}

/// The validated effect of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// `None` for signal-only calls such as a verification request.
    pub mutation: Option<Mutation>,

    /// The notification raised once the mutation is applied.
    pub event: Event,
}

impl Transition {
    pub fn new(mutation: Mutation, event: Event) -> Self {
        Self {
            mutation: Some(mutation),
            event,
        }
    }

    /// A transition that only raises a notification.
    pub fn signal(event: Event) -> Self {
        Self {
            mutation: None,
            event,
        }
    }

    pub fn is_signal(&self) -> bool {
        self.mutation.is_none()
    }
}
