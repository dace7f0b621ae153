//! The Registry: serialized, persistent access to the document registry.
//!
//! Every mutating call runs under one write lock through the same steps:
//! plan against current state, commit the plan to the store, apply it in
//! memory, then broadcast the notification. A rejected plan or a failed
//! commit returns before anything in memory changes.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use docreg_core::{
    validate_signed_call, Call, CoreError, DocumentRecord, Fingerprint, Identity, LoggedEvent,
    SignedCall, MAX_NONCE,
};
use docreg_store::{Commit, Store, StoreError};

use crate::error::{Error, Result};
use crate::state::RegistryState;

/// Configuration for the Registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Buffer size of the notification channel. Slow subscribers that fall
    /// further behind than this miss events (and can catch up through
    /// [`Registry::events_since`]).
    pub event_capacity: usize,

    /// Signed calls must use exactly `last + 1` as nonce. When false any
    /// nonce above the last accepted one is allowed.
    pub require_sequential_nonces: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            event_capacity: 256,
            require_sequential_nonces: true,
        }
    }
}

/// The main Registry struct.
///
/// Provides:
/// - Document registration and verification requests
/// - Verification decisions by authorized verifiers
/// - Verifier-set management by the administrator
/// - Authenticated submission of signed calls
/// - Notifications and a persisted event log
///
/// Mutating calls run on a detached task. Once a call has started it runs to
/// completion (commit, apply, notify) even if the caller stops waiting, so
/// the store and the in-memory state never drift apart.
pub struct Registry<S: Store> {
    inner: Arc<Inner<S>>,
}

/// State shared between the handle and in-flight call tasks.
struct Inner<S: Store> {
    store: S,
    state: RwLock<RegistryState>,
    events: broadcast::Sender<LoggedEvent>,
    config: RegistryConfig,
}

impl<S: Store + 'static> Registry<S> {
    /// Create a new registry in an empty store.
    ///
    /// `deployer` becomes the administrator and the sole verifier.
    pub async fn initialize(deployer: Identity, store: S, config: RegistryConfig) -> Result<Self> {
        store.initialize(&deployer, now_millis()).await?;
        tracing::info!(administrator = %deployer, "initialized registry");
        Ok(Self::with_state(store, RegistryState::genesis(deployer), config))
    }

    /// Open the registry persisted in `store`.
    pub async fn load(store: S, config: RegistryConfig) -> Result<Self> {
        let snapshot = store.load().await?.ok_or(StoreError::NotInitialized)?;
        let state = RegistryState::from_snapshot(snapshot)?;
        tracing::debug!(
            documents = state.documents().len(),
            verifiers = state.access().verifier_count(),
            "loaded registry"
        );
        Ok(Self::with_state(store, state, config))
    }

    fn with_state(store: S, state: RegistryState, config: RegistryConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                store,
                state: RwLock::new(state),
                events,
                config,
            }),
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a document under `hash` with `caller` as owner.
    pub async fn register_document(&self, caller: &Identity, hash: &str, title: &str) -> Result<()> {
        self.execute(
            caller,
            Call::RegisterDocument {
                hash: hash.to_string(),
                title: title.to_string(),
            },
        )
        .await
        .map(|_| ())
    }

    /// Ask verifiers to look at a document. Owner only; changes no state.
    pub async fn request_verification(&self, caller: &Identity, hash: &str) -> Result<()> {
        self.execute(
            caller,
            Call::RequestVerification {
                hash: hash.to_string(),
            },
        )
        .await
        .map(|_| ())
    }

    /// Approve or reject a pending document. Rejections need a reason.
    pub async fn verify_document(
        &self,
        caller: &Identity,
        hash: &str,
        approve: bool,
        reason: &str,
    ) -> Result<()> {
        self.execute(
            caller,
            Call::VerifyDocument {
                hash: hash.to_string(),
                approve,
                reason: reason.to_string(),
            },
        )
        .await
        .map(|_| ())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verifier Management
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn add_verifier(&self, caller: &Identity, identity: &Identity) -> Result<()> {
        self.execute(caller, Call::AddVerifier { identity: *identity })
            .await
            .map(|_| ())
    }

    pub async fn remove_verifier(&self, caller: &Identity, identity: &Identity) -> Result<()> {
        self.execute(caller, Call::RemoveVerifier { identity: *identity })
            .await
            .map(|_| ())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Call Execution
    // ─────────────────────────────────────────────────────────────────────────

    /// Run `call` on behalf of an already authenticated `caller`.
    ///
    /// Returns the logged notification on success.
    pub async fn execute(&self, caller: &Identity, call: Call) -> Result<LoggedEvent> {
        let inner = Arc::clone(&self.inner);
        let caller = *caller;
        tokio::spawn(async move {
            let mut state = inner.state.write().await;
            inner.execute_locked(&mut state, &caller, &call, None).await
        })
        .await?
    }

    /// Authenticate and run a signed call.
    ///
    /// The signature must verify against `signed.caller` and the nonce must
    /// follow the caller's last accepted nonce without exceeding
    /// [`MAX_NONCE`]. Once both hold the nonce is spent, whether or not the
    /// call itself is accepted.
    pub async fn submit(&self, signed: &SignedCall) -> Result<LoggedEvent> {
        if let Err(e) = validate_signed_call(signed) {
            tracing::warn!(
                caller = %signed.caller,
                call = signed.call.name(),
                error = %e,
                "refused signed call"
            );
            return Err(match e {
                CoreError::InvalidSignature | CoreError::InvalidPublicKey => Error::InvalidSignature,
                other => Error::Core(other),
            });
        }

        let inner = Arc::clone(&self.inner);
        let signed = signed.clone();
        tokio::spawn(async move {
            let mut state = inner.state.write().await;
            if let Err(e) = inner.check_nonce(&state, &signed) {
                return Err(e);
            }
            inner
                .execute_locked(&mut state, &signed.caller, &signed.call, Some(signed.nonce))
                .await
        })
        .await?
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a document by hash. Unregistered hashes yield the absent record.
    pub async fn get_document(&self, hash: &str) -> DocumentRecord {
        self.inner.state.read().await.documents().get_document(hash)
    }

    pub async fn is_verifier(&self, identity: &Identity) -> bool {
        self.inner.state.read().await.access().is_verifier(identity)
    }

    pub async fn administrator(&self) -> Identity {
        self.inner.state.read().await.access().administrator()
    }

    /// Current verifiers in ascending key order.
    pub async fn verifiers(&self) -> Vec<Identity> {
        self.inner.state.read().await.access().verifiers()
    }

    pub async fn verifier_count(&self) -> usize {
        self.inner.state.read().await.access().verifier_count()
    }

    pub async fn document_count(&self) -> usize {
        self.inner.state.read().await.documents().len()
    }

    /// Documents registered by `owner`, oldest first.
    pub async fn documents_by_owner(&self, owner: &Identity) -> Vec<DocumentRecord> {
        self.inner.state.read().await.documents().by_owner(owner)
    }

    /// The nonce the next signed call from `identity` must carry.
    pub async fn next_nonce(&self, identity: &Identity) -> u64 {
        self.inner.state.read().await.last_nonce(identity).saturating_add(1)
    }

    /// Map a hash string to its fingerprint.
    pub fn canonicalize(hash: &str) -> Fingerprint {
        docreg_core::canonicalize(hash)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Notifications
    // ─────────────────────────────────────────────────────────────────────────

    /// Receive notifications for calls applied after this point.
    pub fn subscribe(&self) -> broadcast::Receiver<LoggedEvent> {
        self.inner.events.subscribe()
    }

    /// Replay logged notifications with `seq > after_seq`.
    pub async fn events_since(&self, after_seq: u64) -> Result<Vec<LoggedEvent>> {
        Ok(self.inner.store.events_since(after_seq).await?)
    }
}

impl<S: Store> Inner<S> {
    fn check_nonce(&self, state: &RegistryState, signed: &SignedCall) -> Result<()> {
        let last = state.last_nonce(&signed.caller);
        let fresh = if self.config.require_sequential_nonces {
            last.checked_add(1) == Some(signed.nonce)
        } else {
            signed.nonce > last
        };
        if fresh && signed.nonce <= MAX_NONCE {
            return Ok(());
        }

        tracing::warn!(
            caller = %signed.caller,
            last,
            got = signed.nonce,
            "refused signed call with stale nonce"
        );
        Err(Error::InvalidNonce {
            expected: last.saturating_add(1),
            got: signed.nonce,
        })
    }

    async fn execute_locked(
        &self,
        state: &mut RegistryState,
        caller: &Identity,
        call: &Call,
        nonce: Option<u64>,
    ) -> Result<LoggedEvent> {
        let now = now_millis();

        let transition = match state.plan(caller, call, now) {
            Ok(transition) => transition,
            Err(rejection) => {
                tracing::debug!(call = call.name(), %caller, %rejection, "call rejected");
                if let Some(nonce) = nonce {
                    self.store.commit(&Commit::nonce_only(*caller, nonce)).await?;
                    state.record_nonce(*caller, nonce);
                }
                return Err(rejection.into());
            }
        };

        let logged = LoggedEvent {
            seq: state.next_event_seq(),
            at: now,
            event: transition.event,
        };

        let mut commit = Commit::applied(transition.mutation, logged.clone());
        if let Some(nonce) = nonce {
            commit = commit.with_nonce(*caller, nonce);
        }
        self.store.commit(&commit).await?;

        state.apply(commit.mutation, logged.seq);
        if let Some(nonce) = nonce {
            state.record_nonce(*caller, nonce);
        }

        tracing::info!(
            seq = logged.seq,
            event = logged.event.name(),
            %caller,
            "applied call"
        );

        // No receivers is not an error.
        let _ = self.events.send(logged.clone());
        Ok(logged)
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
