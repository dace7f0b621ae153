//! Canonicalization of hash strings and calls.
//!
//! Two deterministic transforms live here:
//!
//! - [`canonicalize`] maps an external hash string to a [`Fingerprint`] using
//!   domain-separated Blake3. The empty string maps to the zero fingerprint.
//! - [`canonical_call_bytes`] encodes a call as RFC 8949 deterministic CBOR
//!   (sorted integer map keys, smallest integer encodings, definite lengths).
//!   This is the byte string callers sign.

use ciborium::value::Value;

use crate::call::Call;
use crate::crypto::Identity;
use crate::error::CoreError;
use crate::types::Fingerprint;

/// Domain separator for fingerprint derivation.
pub const FINGERPRINT_DOMAIN: &[u8] = b"docreg-fingerprint-v0:";

/// Domain separator for signed calls.
pub const CALL_DOMAIN: &[u8] = b"docreg-call-v0:";

/// Current call encoding version.
pub const CALL_VERSION: u8 = 0;

/// Call field keys (integer keys for compact encoding).
///
/// Keys 0-23 encode as single bytes in CBOR.
mod keys {
    pub const VERSION: u64 = 0;
    pub const CALLER: u64 = 1;
    pub const NONCE: u64 = 2;
    pub const OP: u64 = 3;
    pub const HASH: u64 = 4;
    pub const TITLE: u64 = 5;
    pub const APPROVE: u64 = 6;
    pub const REASON: u64 = 7;
    pub const IDENTITY: u64 = 8;
}

/// Map an external hash string to its fingerprint.
///
/// Deterministic. `""` maps to [`Fingerprint::ZERO`]; any other input maps
/// to a Blake3 digest, which is non-zero barring a hash collision.
pub fn canonicalize(raw: &str) -> Fingerprint {
    if raw.is_empty() {
        return Fingerprint::ZERO;
    }

    let mut hasher = blake3::Hasher::new();
    hasher.update(FINGERPRINT_DOMAIN);
    hasher.update(raw.as_bytes());
    Fingerprint(*hasher.finalize().as_bytes())
}

/// Encode `(caller, nonce, call)` to canonical CBOR bytes.
pub fn canonical_call_bytes(caller: &Identity, nonce: u64, call: &Call) -> Result<Vec<u8>, CoreError> {
    let value = call_to_cbor_value(caller, nonce, call);
    let mut buf = Vec::new();
    encode_value_to(&mut buf, &value)?;
    Ok(buf)
}

/// The message a caller signs: `CALL_DOMAIN || canonical_call_bytes`.
pub fn signed_call_message(caller: &Identity, nonce: u64, call: &Call) -> Result<Vec<u8>, CoreError> {
    let body = canonical_call_bytes(caller, nonce, call)?;
    let mut message = Vec::with_capacity(CALL_DOMAIN.len() + body.len());
    message.extend_from_slice(CALL_DOMAIN);
    message.extend_from_slice(&body);
    Ok(message)
}

fn call_to_cbor_value(caller: &Identity, nonce: u64, call: &Call) -> Value {
    let mut entries = vec![
        (
            Value::Integer(keys::VERSION.into()),
            Value::Integer(CALL_VERSION.into()),
        ),
        (
            Value::Integer(keys::CALLER.into()),
            Value::Bytes(caller.0.to_vec()),
        ),
        (Value::Integer(keys::NONCE.into()), Value::Integer(nonce.into())),
        (
            Value::Integer(keys::OP.into()),
            Value::Integer(call.op_code().into()),
        ),
    ];

    match call {
        Call::RegisterDocument { hash, title } => {
            entries.push((Value::Integer(keys::HASH.into()), Value::Text(hash.clone())));
            entries.push((Value::Integer(keys::TITLE.into()), Value::Text(title.clone())));
        }
        Call::RequestVerification { hash } => {
            entries.push((Value::Integer(keys::HASH.into()), Value::Text(hash.clone())));
        }
        Call::VerifyDocument {
            hash,
            approve,
            reason,
        } => {
            entries.push((Value::Integer(keys::HASH.into()), Value::Text(hash.clone())));
            entries.push((Value::Integer(keys::APPROVE.into()), Value::Bool(*approve)));
            entries.push((Value::Integer(keys::REASON.into()), Value::Text(reason.clone())));
        }
        Call::AddVerifier { identity } | Call::RemoveVerifier { identity } => {
            entries.push((
                Value::Integer(keys::IDENTITY.into()),
                Value::Bytes(identity.0.to_vec()),
            ));
        }
    }

    Value::Map(entries)
}

/// Recursively encode a CBOR value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) -> Result<(), CoreError> {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => {
            encode_uint(buf, 4, arr.len() as u64);
            for item in arr {
                encode_value_to(buf, item)?;
            }
        }
        Value::Map(entries) => encode_map_canonical(buf, entries)?,
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Null => buf.push(0xf6),
        other => {
            return Err(CoreError::EncodingError(format!(
                "unsupported CBOR value in canonical encoding: {:?}",
                other
            )))
        }
    }
    Ok(())
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n: i128 = i.into();

    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode a map with keys sorted by their encoded bytes.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) -> Result<(), CoreError> {
    let mut pairs: Vec<(Vec<u8>, &Value)> = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        let mut key_buf = Vec::new();
        encode_value_to(&mut key_buf, k)?;
        pairs.push((key_buf, v));
    }

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value)?;
    }
    Ok(())
}
