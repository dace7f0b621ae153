//! Registry operations as data.
//!
//! Every mutating operation has a [`Call`] variant. The facade dispatches
//! direct method calls and authenticated [`SignedCall`]s through the same
//! path, so both are validated identically.

use serde::{Deserialize, Serialize};

use crate::canonical::signed_call_message;
use crate::crypto::{Identity, Keypair, Signature};
use crate::error::CoreError;

/// Largest nonce a signed call may carry. Nonces must fit a signed 64-bit
/// integer so persistent stores record them exactly.
pub const MAX_NONCE: u64 = i64::MAX as u64;

/// A mutating registry operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Call {
    RegisterDocument { hash: String, title: String },
    RequestVerification { hash: String },
    VerifyDocument { hash: String, approve: bool, reason: String },
    AddVerifier { identity: Identity },
    RemoveVerifier { identity: Identity },
}

impl Call {
    /// Operation tag used in the canonical encoding.
    pub fn op_code(&self) -> u8 {
        match self {
            Call::RegisterDocument { .. } => 1,
            Call::RequestVerification { .. } => 2,
            Call::VerifyDocument { .. } => 3,
            Call::AddVerifier { .. } => 4,
            Call::RemoveVerifier { .. } => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Call::RegisterDocument { .. } => "register_document",
            Call::RequestVerification { .. } => "request_verification",
            Call::VerifyDocument { .. } => "verify_document",
            Call::AddVerifier { .. } => "add_verifier",
            Call::RemoveVerifier { .. } => "remove_verifier",
        }
    }
}

/// A call authenticated by its caller's Ed25519 signature.
///
/// The signature covers the caller, the nonce and the call. Nonces are
/// per-caller and strictly increasing, so a captured call cannot be replayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCall {
    pub caller: Identity,
    pub nonce: u64,
    pub call: Call,
    pub signature: Signature,
}

impl SignedCall {
    /// Sign `call` as the keypair's identity.
    pub fn sign(keypair: &Keypair, nonce: u64, call: Call) -> Result<Self, CoreError> {
        let caller = keypair.identity();
        let message = signed_call_message(&caller, nonce, &call)?;
        let signature = keypair.sign(&message);

        Ok(Self {
            caller,
            nonce,
            call,
            signature,
        })
    }
}
