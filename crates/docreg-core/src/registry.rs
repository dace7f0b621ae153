//! Document registry and verification state machine.
//!
//! The registry maps fingerprints to [`DocumentRecord`]s. Records are created
//! by registration, changed only by the single Pending → Approved/Rejected
//! decision, and never deleted.
//!
//! All `plan_*` methods are read-only: they check preconditions in a fixed
//! order and return the [`Transition`] a successful call would apply. The
//! check order decides which error is reported when several preconditions
//! fail at once.

use std::collections::{BTreeSet, HashMap};

use crate::canonical::canonicalize;
use crate::crypto::Identity;
use crate::error::RegistryError;
use crate::event::Event;
use crate::record::DocumentRecord;
use crate::transition::{Mutation, Transition};
use crate::types::Fingerprint;

/// Membership oracle for the verifier role.
pub trait VerifierSet {
    fn is_verifier(&self, identity: &Identity) -> bool;
}

impl VerifierSet for BTreeSet<Identity> {
    fn is_verifier(&self, identity: &Identity) -> bool {
        self.contains(identity)
    }
}

/// Fingerprint-keyed record map.
#[derive(Debug, Clone, Default)]
pub struct DocumentRegistry {
    documents: HashMap<Fingerprint, DocumentRecord>,
}

impl DocumentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted records.
    pub fn from_records(records: impl IntoIterator<Item = DocumentRecord>) -> Self {
        Self {
            documents: records
                .into_iter()
                .map(|record| (record.fingerprint, record))
                .collect(),
        }
    }

    /// Look up a document by its external hash string.
    ///
    /// Never fails: unregistered hashes yield [`DocumentRecord::absent`].
    pub fn get_document(&self, raw_hash: &str) -> DocumentRecord {
        self.get(&canonicalize(raw_hash))
            .cloned()
            .unwrap_or_else(DocumentRecord::absent)
    }

    /// Look up a document by fingerprint.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&DocumentRecord> {
        self.documents.get(fingerprint)
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.documents.contains_key(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All records, in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &DocumentRecord> {
        self.documents.values()
    }

    /// Records registered by `owner`, oldest first.
    pub fn by_owner(&self, owner: &Identity) -> Vec<DocumentRecord> {
        let mut records: Vec<DocumentRecord> = self
            .documents
            .values()
            .filter(|r| &r.owner == owner)
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            a.registered_at
                .cmp(&b.registered_at)
                .then_with(|| a.fingerprint.cmp(&b.fingerprint))
        });
        records
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Planning
    // ─────────────────────────────────────────────────────────────────────────

    /// Plan a registration by `caller`.
    ///
    /// Fails with `EmptyHash` for the zero fingerprint, then
    /// `DocumentAlreadyRegistered` if the fingerprint is taken.
    pub fn plan_register(
        &self,
        caller: &Identity,
        raw_hash: &str,
        title: &str,
        now: i64,
    ) -> Result<Transition, RegistryError> {
        let fingerprint = canonicalize(raw_hash);
        if fingerprint.is_zero() {
            return Err(RegistryError::EmptyHash);
        }
        if self.contains(&fingerprint) {
            return Err(RegistryError::DocumentAlreadyRegistered(fingerprint));
        }

        let record = DocumentRecord::new(fingerprint, raw_hash, title, *caller, now);
        let event = Event::DocumentRegistered {
            fingerprint,
            title: title.to_string(),
            owner: *caller,
        };

        Ok(Transition::new(Mutation::InsertDocument(record), event))
    }

    /// Plan a verification request. Signal only: no state changes.
    pub fn plan_request(&self, caller: &Identity, raw_hash: &str) -> Result<Transition, RegistryError> {
        let record = self.existing(raw_hash)?;
        if &record.owner != caller {
            return Err(RegistryError::OnlyOwnerCanRequest);
        }

        Ok(Transition::signal(Event::VerificationRequested {
            fingerprint: record.fingerprint,
            owner: record.owner,
        }))
    }

    /// Plan a verification decision.
    ///
    /// Checks, in order: the document exists, the caller is a verifier, the
    /// document is still pending, and a rejection carries a reason.
    pub fn plan_verify<V: VerifierSet + ?Sized>(
        &self,
        caller: &Identity,
        verifiers: &V,
        raw_hash: &str,
        approve: bool,
        reason: &str,
    ) -> Result<Transition, RegistryError> {
        let record = self.existing(raw_hash)?;

        if !verifiers.is_verifier(caller) {
            return Err(RegistryError::NotAuthorizedVerifier);
        }

        if record.is_decided() {
            return Err(RegistryError::VerificationCompleted);
        }

        if !approve && reason.is_empty() {
            return Err(RegistryError::RejectionReasonRequired);
        }

        let decided = record.decided_by(*caller, approve, reason);
        let event = Event::DocumentVerified {
            fingerprint: decided.fingerprint,
            status: decided.status,
            verifier: *caller,
            reason: reason.to_string(),
        };

        Ok(Transition::new(Mutation::UpdateDocument(decided), event))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Application
    // ─────────────────────────────────────────────────────────────────────────

    /// Store a record produced by a planned transition.
    pub fn upsert(&mut self, record: DocumentRecord) {
        self.documents.insert(record.fingerprint, record);
    }

    fn existing(&self, raw_hash: &str) -> Result<&DocumentRecord, RegistryError> {
        let fingerprint = canonicalize(raw_hash);
        self.get(&fingerprint)
            .ok_or(RegistryError::DocumentDoesNotExist(fingerprint))
    }
}
