//! Store trait: the abstract interface for registry persistence.
//!
//! The facade never writes piecemeal. Each call produces at most one
//! [`Commit`], which a backend must apply in full or not at all.

use async_trait::async_trait;
use docreg_core::{DocumentRecord, Identity, LoggedEvent, Mutation};

use crate::error::Result;

/// Everything needed to rebuild a registry in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Set once at initialization.
    pub administrator: Identity,

    /// Current verifiers in ascending key order.
    pub verifiers: Vec<Identity>,

    /// All registered documents, in no particular order.
    pub documents: Vec<DocumentRecord>,

    /// Last accepted signed-call nonce per identity.
    pub nonces: Vec<(Identity, u64)>,

    /// Highest event sequence number, 0 if no events were logged.
    pub last_event_seq: u64,
}

/// The durable effect of one call.
///
/// A rejected signed call still consumes its nonce, so every field is
/// optional and a commit may carry only a nonce update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    pub mutation: Option<Mutation>,
    pub event: Option<LoggedEvent>,
    pub nonce: Option<(Identity, u64)>,
}

impl Commit {
    /// A commit for an applied call.
    pub fn applied(mutation: Option<Mutation>, event: LoggedEvent) -> Self {
        Self {
            mutation,
            event: Some(event),
            nonce: None,
        }
    }

    /// A commit that only advances a caller's nonce.
    pub fn nonce_only(identity: Identity, nonce: u64) -> Self {
        Self {
            mutation: None,
            event: None,
            nonce: Some((identity, nonce)),
        }
    }

    /// Attach a nonce update.
    pub fn with_nonce(mut self, identity: Identity, nonce: u64) -> Self {
        self.nonce = Some((identity, nonce));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.mutation.is_none() && self.event.is_none() && self.nonce.is_none()
    }
}

/// The Store trait: async interface for registry persistence.
///
/// For SQLite, blocking work runs on `spawn_blocking`.
///
/// # Consistency
///
/// - `commit` is atomic. An `InsertDocument` for a stored fingerprint, an
///   `UpdateDocument` for a missing one, or an event whose sequence number is
///   taken fails the whole commit with `InvalidData`.
/// - Every method other than `initialize` and `load` fails with
///   `NotInitialized` on an empty store.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Record the administrator and make it the sole verifier.
    ///
    /// Fails with `AlreadyInitialized` if the store holds a registry.
    async fn initialize(&self, administrator: &Identity, at: i64) -> Result<()>;

    /// Load the full registry state, or `None` for an empty store.
    async fn load(&self) -> Result<Option<Snapshot>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply one call's effects atomically.
    async fn commit(&self, commit: &Commit) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// Logged events with `seq > after_seq`, in ascending order.
    async fn events_since(&self, after_seq: u64) -> Result<Vec<LoggedEvent>>;
}
