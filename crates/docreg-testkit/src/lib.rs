//! # Docreg Testkit
//!
//! Testing utilities for the document registry.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: fixed fingerprints and call encodings that pin the
//!   canonical transforms
//! - **Generators**: proptest strategies for hashes, identities and random
//!   operation sequences
//! - **Fixtures**: deterministic parties and a ready registry
//!
//! ## Golden Vectors
//!
//! ```rust
//! use docreg_testkit::vectors::verify_all_vectors;
//!
//! for (name, ok, detail) in verify_all_vectors() {
//!     assert!(ok, "{}: {}", name, detail);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use docreg_testkit::generators::hash_string;
//!
//! proptest! {
//!     #[test]
//!     fn fingerprint_is_nonzero(hash in hash_string()) {
//!         prop_assert!(!docreg_core::canonicalize(&hash).is_zero());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use docreg_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let call = fixture.register("0xabc", "Deed");
//! let signed = fixture.sign_as_owner(1, call);
//! assert_eq!(signed.caller, fixture.owner_id());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_keypairs, random_hash, TestFixture};
pub use generators::{Op, OpSequence};
pub use vectors::{all_vectors, call_vectors, verify_all_vectors, CallVector, FingerprintVector};
