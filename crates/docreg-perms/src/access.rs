//! Administrator and verifier-set state.

use std::collections::BTreeSet;

use docreg_core::{Event, Identity, Mutation, RegistryError, Transition, VerifierSet};

use crate::error::{PermsError, Result};

/// Access-control state: one immutable administrator and a non-empty
/// verifier set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessControl {
    administrator: Identity,
    verifiers: BTreeSet<Identity>,
}

impl AccessControl {
    /// Initial state for a fresh registry: `deployer` is both administrator
    /// and sole verifier.
    pub fn new(deployer: Identity) -> Self {
        let mut verifiers = BTreeSet::new();
        verifiers.insert(deployer);
        Self {
            administrator: deployer,
            verifiers,
        }
    }

    /// Rebuild from persisted parts.
    pub fn from_parts(
        administrator: Identity,
        verifiers: impl IntoIterator<Item = Identity>,
    ) -> Result<Self> {
        let verifiers: BTreeSet<Identity> = verifiers.into_iter().collect();
        if verifiers.is_empty() {
            return Err(PermsError::EmptyVerifierSet);
        }
        Ok(Self {
            administrator,
            verifiers,
        })
    }

    pub fn administrator(&self) -> Identity {
        self.administrator
    }

    pub fn is_administrator(&self, identity: &Identity) -> bool {
        &self.administrator == identity
    }

    pub fn is_verifier(&self, identity: &Identity) -> bool {
        self.verifiers.contains(identity)
    }

    /// Current verifiers in ascending key order.
    pub fn verifiers(&self) -> Vec<Identity> {
        self.verifiers.iter().copied().collect()
    }

    pub fn verifier_count(&self) -> usize {
        self.verifiers.len()
    }

    /// Plan adding `identity` to the verifier set.
    pub fn plan_add(
        &self,
        caller: &Identity,
        identity: &Identity,
    ) -> std::result::Result<Transition, RegistryError> {
        if !self.is_administrator(caller) {
            return Err(RegistryError::NotAuthorized);
        }
        if self.is_verifier(identity) {
            return Err(RegistryError::AlreadyVerifier(*identity));
        }

        Ok(Transition::new(
            Mutation::AddVerifier(*identity),
            Event::VerifierAdded {
                verifier: *identity,
            },
        ))
    }

    /// Plan removing `identity` from the verifier set.
    ///
    /// The last remaining verifier cannot be removed, including the
    /// administrator.
    pub fn plan_remove(
        &self,
        caller: &Identity,
        identity: &Identity,
    ) -> std::result::Result<Transition, RegistryError> {
        if !self.is_administrator(caller) {
            return Err(RegistryError::NotAuthorized);
        }
        if !self.is_verifier(identity) {
            return Err(RegistryError::NotVerifier(*identity));
        }
        if self.verifiers.len() == 1 {
            return Err(RegistryError::CannotRemoveLastVerifier);
        }

        Ok(Transition::new(
            Mutation::RemoveVerifier(*identity),
            Event::VerifierRemoved {
                verifier: *identity,
            },
        ))
    }

    /// Apply a planned membership mutation.
    ///
    /// Document mutations are ignored. Returns whether the set changed.
    pub fn apply(&mut self, mutation: &Mutation) -> bool {
        match mutation {
            Mutation::AddVerifier(identity) => self.verifiers.insert(*identity),
            Mutation::RemoveVerifier(identity) => {
                // Only reachable through plan_remove, which keeps one member.
                if self.verifiers.len() > 1 {
                    self.verifiers.remove(identity)
                } else {
                    false
                }
            }
            Mutation::InsertDocument(_) | Mutation::UpdateDocument(_) => false,
        }
    }
}

impl VerifierSet for AccessControl {
    fn is_verifier(&self, identity: &Identity) -> bool {
        AccessControl::is_verifier(self, identity)
    }
}
