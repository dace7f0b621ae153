//! # Docreg Store
//!
//! Storage abstraction for the document registry. Provides a trait-based
//! interface with SQLite and in-memory implementations.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`Commit`] - The durable effect of one call
//! - [`Snapshot`] - Full state for rebuilding a registry on startup
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docreg_core::Identity;
//! use docreg_store::{SqliteStore, Store};
//!
//! async fn example() {
//!     let store = SqliteStore::open("registry.db").unwrap();
//!
//!     let admin = Identity::from_bytes([1; 32]);
//!     store.initialize(&admin, 0).await.unwrap();
//!
//!     let snapshot = store.load().await.unwrap().unwrap();
//!     assert_eq!(snapshot.verifiers, vec![admin]);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Atomic commits**: a commit lands completely or not at all
//! - **Append-only log**: events are never rewritten
//! - **No deletes**: documents are inserted once and updated once

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{Commit, Snapshot, Store};
