//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use rand::RngCore;

use docreg::{Registry, RegistryConfig};
use docreg_core::{Call, Identity, Keypair, SignedCall};
use docreg_store::MemoryStore;

/// Four deterministic parties: an administrator, a document owner, a
/// verifier and an outsider with no role.
pub struct TestFixture {
    pub admin: Keypair,
    pub owner: Keypair,
    pub verifier: Keypair,
    pub outsider: Keypair,
}

impl TestFixture {
    /// Create a fixture with fixed seeds.
    pub fn new() -> Self {
        Self {
            admin: Keypair::from_seed(&[0x01; 32]),
            owner: Keypair::from_seed(&[0x02; 32]),
            verifier: Keypair::from_seed(&[0x03; 32]),
            outsider: Keypair::from_seed(&[0x04; 32]),
        }
    }

    pub fn admin_id(&self) -> Identity {
        self.admin.identity()
    }

    pub fn owner_id(&self) -> Identity {
        self.owner.identity()
    }

    pub fn verifier_id(&self) -> Identity {
        self.verifier.identity()
    }

    pub fn outsider_id(&self) -> Identity {
        self.outsider.identity()
    }

    /// An in-memory registry administered by `admin`, with `verifier`
    /// already added.
    pub async fn registry(&self) -> docreg::Result<Registry<MemoryStore>> {
        let registry =
            Registry::initialize(self.admin_id(), MemoryStore::new(), RegistryConfig::default())
                .await?;
        registry
            .add_verifier(&self.admin_id(), &self.verifier_id())
            .await?;
        Ok(registry)
    }

    pub fn register(&self, hash: &str, title: &str) -> Call {
        Call::RegisterDocument {
            hash: hash.to_string(),
            title: title.to_string(),
        }
    }

    pub fn approve(&self, hash: &str) -> Call {
        Call::VerifyDocument {
            hash: hash.to_string(),
            approve: true,
            reason: String::new(),
        }
    }

    pub fn reject(&self, hash: &str, reason: &str) -> Call {
        Call::VerifyDocument {
            hash: hash.to_string(),
            approve: false,
            reason: reason.to_string(),
        }
    }

    /// Sign `call` as the owner.
    ///
    /// # Panics
    ///
    /// If the call cannot be encoded, which no `Call` triggers.
    pub fn sign_as_owner(&self, nonce: u64, call: Call) -> SignedCall {
        sign(&self.owner, nonce, call)
    }

    /// Sign `call` as the verifier. Panics like [`Self::sign_as_owner`].
    pub fn sign_as_verifier(&self, nonce: u64, call: Call) -> SignedCall {
        sign(&self.verifier, nonce, call)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn sign(keypair: &Keypair, nonce: u64, call: Call) -> SignedCall {
    SignedCall::sign(keypair, nonce, call).expect("calls always encode")
}

/// Deterministic keypairs for `count` distinct parties.
pub fn multi_party_keypairs(count: usize) -> Vec<Keypair> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[..8].copy_from_slice(&(i as u64).to_le_bytes());
            seed[31] = 0xd0;
            Keypair::from_seed(&seed)
        })
        .collect()
}

/// A fresh `0x`-prefixed hash string.
pub fn random_hash() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}
