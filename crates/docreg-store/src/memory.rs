//! In-memory implementation of the Store trait.
//!
//! Same semantics as SQLite, nothing persisted. Used by tests and by
//! embedders that keep their own durability.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use docreg_core::{DocumentRecord, Fingerprint, Identity, LoggedEvent, Mutation};

use crate::error::{Result, StoreError};
use crate::traits::{Commit, Snapshot, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// `None` until initialized.
    administrator: Option<Identity>,

    verifiers: BTreeSet<Identity>,

    documents: HashMap<Fingerprint, DocumentRecord>,

    /// Event log keyed by sequence number.
    events: BTreeMap<u64, LoggedEvent>,

    nonces: HashMap<Identity, u64>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner.read().map_err(poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner.write().map_err(poisoned)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: PoisonError<T>) -> StoreError {
    StoreError::LockPoisoned(e.to_string())
}

impl MemoryStoreInner {
    fn require_initialized(&self) -> Result<()> {
        if self.administrator.is_none() {
            return Err(StoreError::NotInitialized);
        }
        Ok(())
    }

    /// Check a commit against current contents without changing anything.
    fn check(&self, commit: &Commit) -> Result<()> {
        match &commit.mutation {
            Some(Mutation::InsertDocument(record)) if self.documents.contains_key(&record.fingerprint) => {
                return Err(StoreError::InvalidData(format!(
                    "document {} already stored",
                    record.fingerprint
                )));
            }
            Some(Mutation::UpdateDocument(record)) if !self.documents.contains_key(&record.fingerprint) => {
                return Err(StoreError::InvalidData(format!(
                    "document {} not stored",
                    record.fingerprint
                )));
            }
            Some(Mutation::AddVerifier(identity)) if self.verifiers.contains(identity) => {
                return Err(StoreError::InvalidData(format!(
                    "verifier {} already stored",
                    identity
                )));
            }
            Some(Mutation::RemoveVerifier(identity)) if !self.verifiers.contains(identity) => {
                return Err(StoreError::InvalidData(format!(
                    "verifier {} not stored",
                    identity
                )));
            }
            _ => {}
        }

        if let Some(event) = &commit.event {
            if self.events.contains_key(&event.seq) {
                return Err(StoreError::InvalidData(format!(
                    "event seq {} already stored",
                    event.seq
                )));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn initialize(&self, administrator: &Identity, _at: i64) -> Result<()> {
        let mut inner = self.write()?;
        if inner.administrator.is_some() {
            return Err(StoreError::AlreadyInitialized);
        }

        inner.administrator = Some(*administrator);
        inner.verifiers.insert(*administrator);
        Ok(())
    }

    async fn load(&self) -> Result<Option<Snapshot>> {
        let inner = self.read()?;
        let Some(administrator) = inner.administrator else {
            return Ok(None);
        };

        Ok(Some(Snapshot {
            administrator,
            verifiers: inner.verifiers.iter().copied().collect(),
            documents: inner.documents.values().cloned().collect(),
            nonces: inner.nonces.iter().map(|(id, n)| (*id, *n)).collect(),
            last_event_seq: inner.events.keys().next_back().copied().unwrap_or(0),
        }))
    }

    async fn commit(&self, commit: &Commit) -> Result<()> {
        let mut inner = self.write()?;
        inner.require_initialized()?;
        inner.check(commit)?;

        match &commit.mutation {
            Some(Mutation::InsertDocument(record)) | Some(Mutation::UpdateDocument(record)) => {
                inner.documents.insert(record.fingerprint, record.clone());
            }
            Some(Mutation::AddVerifier(identity)) => {
                inner.verifiers.insert(*identity);
            }
            Some(Mutation::RemoveVerifier(identity)) => {
                inner.verifiers.remove(identity);
            }
            None => {}
        }

        if let Some(event) = &commit.event {
            inner.events.insert(event.seq, event.clone());
        }

        if let Some((identity, nonce)) = commit.nonce {
            inner.nonces.insert(identity, nonce);
        }

        Ok(())
    }

    async fn events_since(&self, after_seq: u64) -> Result<Vec<LoggedEvent>> {
        let inner = self.read()?;
        inner.require_initialized()?;
        Ok(inner
            .events
            .range(after_seq.saturating_add(1)..)
            .map(|(_, e)| e.clone())
            .collect())
    }
}
