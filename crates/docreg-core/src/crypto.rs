//! Caller identities and Ed25519 signing.
//!
//! Every party the registry knows about (the administrator, verifiers,
//! document owners) is named by an [`Identity`]: the 32 public key bytes of
//! an Ed25519 keypair. Hosts that authenticate callers themselves pass the
//! identity straight to the registry. Everyone else proves it by signing a
//! [`SignedCall`](crate::SignedCall) with the matching [`Keypair`].

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Hex digits shown when an identity or signature is printed.
const SHORT_HEX: usize = 16;

/// The public key a caller acts under.
///
/// Any 32 bytes form an identity. Whether they decode to a curve point only
/// matters once a signature has to be checked against them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity(pub [u8; 32]);

impl Identity {
    /// Owner of every absent record. Never a verifier or administrator.
    pub const ZERO: Self = Self([0u8; 32]);

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse 64 hex digits, as printed by [`Identity::to_hex`].
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Check that `signature` over `message` was made by this caller.
    ///
    /// Fails with [`CoreError::InvalidPublicKey`] when the identity is not a
    /// usable key at all, and [`CoreError::InvalidSignature`] otherwise.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), CoreError> {
        let key = VerifyingKey::from_bytes(&self.0).map_err(|_| CoreError::InvalidPublicKey)?;
        key.verify(message, &ed25519_dalek::Signature::from_bytes(&signature.0))
            .map_err(|_| CoreError::InvalidSignature)
    }

    fn short_hex(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(SHORT_HEX);
        hex
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.short_hex())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_hex())
    }
}

/// Signature over a call's signing message.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    /// Never verifies. Stands in until a call is signed.
    pub const ZERO: Self = Self([0u8; 64]);

    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}..)", hex::encode(&self.0[..SHORT_HEX / 2]))
    }
}

/// Secret key of a caller. Signs calls on behalf of [`Keypair::identity`].
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// A fresh key from the thread-local RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut rand::thread_rng()),
        }
    }

    /// Derive the key from a fixed seed. Tests and fixtures use this to get
    /// stable parties.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }
}

// Only the public half is printed.
impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({})", self.identity())
    }
}
