//! # Docreg Permissions
//!
//! Role-based access control for the document registry.
//!
//! ## Roles
//!
//! - **Administrator**: fixed at initialization. The only identity that may
//!   change the verifier set.
//! - **Verifier**: may approve or reject pending documents. The set always
//!   holds at least one member.
//!
//! The deploying identity becomes the administrator and the sole initial
//! verifier.
//!
//! ## Planning
//!
//! Membership changes follow the same plan/apply split as the document
//! registry: [`AccessControl::plan_add`] and [`AccessControl::plan_remove`]
//! check preconditions and return a [`Transition`](docreg_core::Transition)
//! without mutating anything. The caller applies it once it is durable.
//!
//! ```rust
//! use docreg_core::Identity;
//! use docreg_perms::AccessControl;
//!
//! let admin = Identity::from_bytes([1; 32]);
//! let alice = Identity::from_bytes([2; 32]);
//!
//! let mut access = AccessControl::new(admin);
//! let plan = access.plan_add(&admin, &alice).unwrap();
//! access.apply(plan.mutation.as_ref().unwrap());
//!
//! assert!(access.is_verifier(&alice));
//! assert_eq!(access.verifier_count(), 2);
//! ```

pub mod access;
pub mod error;

pub use access::AccessControl;
pub use error::{PermsError, Result};
