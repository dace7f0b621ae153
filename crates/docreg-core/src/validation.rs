//! Signed call validation.

use crate::call::SignedCall;
use crate::canonical::signed_call_message;
use crate::error::CoreError;

/// Verify that `signed.signature` was made by `signed.caller` over the
/// canonical encoding of the call.
///
/// Nonce freshness is not checked here; it depends on registry state.
pub fn validate_signed_call(signed: &SignedCall) -> Result<(), CoreError> {
    let message = signed_call_message(&signed.caller, signed.nonce, &signed.call)?;
    signed.caller.verify(&message, &signed.signature)
}
