//! # Docreg
//!
//! A document registry with a two-step verification workflow: an owner
//! registers a document by hash and requests verification, and a member of
//! the verifier set approves or rejects it. Rejections carry a reason.
//!
//! ## Overview
//!
//! - **Documents** are keyed by the fingerprint of their hash string and are
//!   never deleted.
//! - **Verification** moves a document from Pending to Approved or Rejected
//!   exactly once.
//! - **Verifiers** are managed by a single administrator. The set is never
//!   empty.
//! - **Notifications** are logged and broadcast after each applied call.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docreg::{Registry, RegistryConfig};
//! use docreg::core::Keypair;
//! use docreg::store::SqliteStore;
//!
//! async fn example() {
//!     let admin = Keypair::generate().identity();
//!     let owner = Keypair::generate().identity();
//!
//!     let store = SqliteStore::open("registry.db").unwrap();
//!     let registry = Registry::initialize(admin, store, RegistryConfig::default())
//!         .await
//!         .unwrap();
//!
//!     registry.register_document(&owner, "0xabc", "Deed").await.unwrap();
//!     registry.request_verification(&owner, "0xabc").await.unwrap();
//!     registry.verify_document(&admin, "0xabc", true, "").await.unwrap();
//!
//!     let record = registry.get_document("0xabc").await;
//!     assert!(record.exists);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `docreg::core` - Fingerprints, records, calls, the state machine
//! - `docreg::perms` - Administrator and verifier set
//! - `docreg::store` - Storage abstraction and SQLite

pub mod error;
pub mod registry;
pub mod state;

pub use docreg_core as core;
pub use docreg_perms as perms;
pub use docreg_store as store;

pub use error::{Error, Result};
pub use registry::{Registry, RegistryConfig};
pub use state::RegistryState;

pub use docreg_core::{
    canonicalize, Call, DocumentRecord, Event, Fingerprint, Identity, Keypair, LoggedEvent,
    RegistryError, SignedCall, VerificationStatus,
};
