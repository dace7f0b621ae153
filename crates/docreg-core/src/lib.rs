//! # Docreg Core
//!
//! Pure primitives for the document registry: fingerprints, document records,
//! notifications, and the verification state machine.
//!
//! This crate contains no I/O, no storage, no networking. Every operation is
//! split into a *plan* step that validates a call against the current state
//! and returns a [`Transition`], and an *apply* step that performs the
//! mutation. Callers persist the transition in between, which keeps each call
//! all-or-nothing.
//!
//! ## Key Types
//!
//! - [`Fingerprint`] - Canonical 32-byte document identifier
//! - [`Identity`] - Caller identity (Ed25519 public key)
//! - [`DocumentRecord`] - Persisted state for one registered document
//! - [`VerificationStatus`] - Pending, Approved or Rejected
//! - [`Event`] - Notification raised by a successful call
//! - [`Call`] / [`SignedCall`] - Operations as data, optionally signed
//! - [`DocumentRegistry`] - The fingerprint-keyed record map
//!
//! ## Canonicalization
//!
//! External hash strings are mapped to fingerprints by [`canonicalize`]. The
//! empty string maps to [`Fingerprint::ZERO`], which is never registrable.

pub mod call;
pub mod canonical;
pub mod crypto;
pub mod error;
pub mod event;
pub mod record;
pub mod registry;
pub mod transition;
pub mod types;
pub mod validation;

pub use call::{Call, SignedCall, MAX_NONCE};
pub use canonical::{canonical_call_bytes, canonicalize, signed_call_message};
pub use crypto::{Identity, Keypair, Signature};
pub use error::{CoreError, RegistryError};
pub use event::{Event, LoggedEvent};
pub use record::{DocumentRecord, VerificationStatus};
pub use registry::{DocumentRegistry, VerifierSet};
pub use transition::{Mutation, Transition};
pub use types::Fingerprint;
pub use validation::validate_signed_call;
