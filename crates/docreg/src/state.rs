//! The owned registry state container.
//!
//! `RegistryState` joins access control, the document registry and the
//! signed-call nonces into the single authoritative state that every call is
//! serialized against. It never talks to storage: [`Registry`](crate::Registry)
//! commits first and applies here second.

use std::collections::HashMap;

use docreg_core::{Call, DocumentRegistry, Identity, Mutation, RegistryError, Transition};
use docreg_perms::AccessControl;
use docreg_store::Snapshot;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct RegistryState {
    pub(crate) access: AccessControl,
    pub(crate) documents: DocumentRegistry,
    nonces: HashMap<Identity, u64>,
    last_event_seq: u64,
}

impl RegistryState {
    /// Fresh state with `deployer` as administrator and sole verifier.
    pub fn genesis(deployer: Identity) -> Self {
        Self {
            access: AccessControl::new(deployer),
            documents: DocumentRegistry::new(),
            nonces: HashMap::new(),
            last_event_seq: 0,
        }
    }

    /// Rebuild from a persisted snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        Ok(Self {
            access: AccessControl::from_parts(snapshot.administrator, snapshot.verifiers)?,
            documents: DocumentRegistry::from_records(snapshot.documents),
            nonces: snapshot.nonces.into_iter().collect(),
            last_event_seq: snapshot.last_event_seq,
        })
    }

    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    pub fn documents(&self) -> &DocumentRegistry {
        &self.documents
    }

    /// Sequence number the next logged event will carry.
    pub fn next_event_seq(&self) -> u64 {
        self.last_event_seq + 1
    }

    /// Last accepted signed-call nonce for `identity`, 0 if none.
    pub fn last_nonce(&self, identity: &Identity) -> u64 {
        self.nonces.get(identity).copied().unwrap_or(0)
    }

    /// Validate `call` from `caller` and return its effect. Read-only.
    pub fn plan(
        &self,
        caller: &Identity,
        call: &Call,
        now: i64,
    ) -> std::result::Result<Transition, RegistryError> {
        match call {
            Call::RegisterDocument { hash, title } => {
                self.documents.plan_register(caller, hash, title, now)
            }
            Call::RequestVerification { hash } => self.documents.plan_request(caller, hash),
            Call::VerifyDocument {
                hash,
                approve,
                reason,
            } => self
                .documents
                .plan_verify(caller, &self.access, hash, *approve, reason),
            Call::AddVerifier { identity } => self.access.plan_add(caller, identity),
            Call::RemoveVerifier { identity } => self.access.plan_remove(caller, identity),
        }
    }

    /// Apply a committed mutation and advance the event sequence.
    pub(crate) fn apply(&mut self, mutation: Option<Mutation>, event_seq: u64) {
        match mutation {
            Some(Mutation::InsertDocument(record)) | Some(Mutation::UpdateDocument(record)) => {
                self.documents.upsert(record)
            }
            Some(membership) => {
                self.access.apply(&membership);
            }
            None => {}
        }
        self.last_event_seq = event_seq;
    }

    pub(crate) fn record_nonce(&mut self, identity: Identity, nonce: u64) {
        self.nonces.insert(identity, nonce);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docreg_core::{canonicalize, DocumentRecord, Event, VerificationStatus};

    fn id(byte: u8) -> Identity {
        Identity::from_bytes([byte; 32])
    }

    fn run(state: &mut RegistryState, caller: Identity, call: Call) -> std::result::Result<Event, RegistryError> {
        let transition = state.plan(&caller, &call, 1_000)?;
        let seq = state.next_event_seq();
        state.apply(transition.mutation, seq);
        Ok(transition.event)
    }

    #[test]
    fn test_genesis() {
        let state = RegistryState::genesis(id(0xad));
        assert_eq!(state.access().administrator(), id(0xad));
        assert!(state.access().is_verifier(&id(0xad)));
        assert!(state.documents().is_empty());
        assert_eq!(state.next_event_seq(), 1);
    }

    #[test]
    fn test_dispatch_end_to_end() {
        let admin = id(0xad);
        let owner = id(0xa1);
        let verifier = id(0xf1);
        let mut state = RegistryState::genesis(admin);

        run(&mut state, admin, Call::AddVerifier { identity: verifier }).unwrap();
        run(
            &mut state,
            owner,
            Call::RegisterDocument {
                hash: "0xabc".into(),
                title: "T".into(),
            },
        )
        .unwrap();
        run(
            &mut state,
            owner,
            Call::RequestVerification {
                hash: "0xabc".into(),
            },
        )
        .unwrap();
        let event = run(
            &mut state,
            verifier,
            Call::VerifyDocument {
                hash: "0xabc".into(),
                approve: true,
                reason: String::new(),
            },
        )
        .unwrap();

        assert!(matches!(
            event,
            Event::DocumentVerified {
                status: VerificationStatus::Approved,
                ..
            }
        ));
        assert_eq!(state.next_event_seq(), 5);
        assert_eq!(
            state.documents().get_document("0xabc").status,
            VerificationStatus::Approved
        );
    }

    #[test]
    fn test_verify_uses_live_verifier_set() {
        let admin = id(0xad);
        let verifier = id(0xf1);
        let mut state = RegistryState::genesis(admin);
        run(&mut state, admin, Call::AddVerifier { identity: verifier }).unwrap();
        run(&mut state, admin, Call::RemoveVerifier { identity: verifier }).unwrap();
        run(
            &mut state,
            id(1),
            Call::RegisterDocument {
                hash: "0xabc".into(),
                title: String::new(),
            },
        )
        .unwrap();

        let err = run(
            &mut state,
            verifier,
            Call::VerifyDocument {
                hash: "0xabc".into(),
                approve: true,
                reason: String::new(),
            },
        )
        .unwrap_err();
        assert_eq!(err, RegistryError::NotAuthorizedVerifier);
    }

    #[test]
    fn test_from_snapshot() {
        let record = DocumentRecord::new(canonicalize("0xabc"), "0xabc", "T", id(1), 5);
        let snapshot = Snapshot {
            administrator: id(0xad),
            verifiers: vec![id(0xf1)],
            documents: vec![record.clone()],
            nonces: vec![(id(1), 7)],
            last_event_seq: 9,
        };

        let state = RegistryState::from_snapshot(snapshot).unwrap();
        assert_eq!(state.access().administrator(), id(0xad));
        assert!(!state.access().is_verifier(&id(0xad)));
        assert_eq!(state.documents().get_document("0xabc"), record);
        assert_eq!(state.last_nonce(&id(1)), 7);
        assert_eq!(state.last_nonce(&id(2)), 0);
        assert_eq!(state.next_event_seq(), 10);
    }

    #[test]
    fn test_from_snapshot_rejects_empty_verifier_set() {
        let snapshot = Snapshot {
            administrator: id(0xad),
            verifiers: Vec::new(),
            documents: Vec::new(),
            nonces: Vec::new(),
            last_event_seq: 0,
        };
        assert!(matches!(
            RegistryState::from_snapshot(snapshot),
            Err(crate::Error::Permission(_))
        ));
    }
}
