//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the fingerprint transform and the canonical call
//! encoding. Any implementation that registers documents under the same
//! fingerprints or accepts the same signatures must reproduce them exactly.

use serde::Serialize;

use docreg_core::{canonical_call_bytes, canonicalize, Call, Identity};

/// A fixed hash string and the fingerprint it must canonicalize to.
#[derive(Debug, Clone, Serialize)]
pub struct FingerprintVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// The external hash string.
    pub input: &'static str,
    /// Expected fingerprint (hex).
    pub expected_hex: &'static str,
}

/// A fixed call and its expected canonical CBOR encoding.
#[derive(Debug, Clone, Serialize)]
pub struct CallVector {
    pub name: &'static str,
    pub caller: [u8; 32],
    pub nonce: u64,
    pub call: Call,
    /// Expected canonical bytes without the signing domain (hex).
    pub expected_hex: &'static str,
}

/// Get all fingerprint vectors.
pub fn all_vectors() -> Vec<FingerprintVector> {
    vec![
        FingerprintVector {
            name: "empty string is zero",
            input: "",
            expected_hex: "0000000000000000000000000000000000000000000000000000000000000000",
        },
        FingerprintVector {
            name: "short hex",
            input: "0xabc",
            expected_hex: "763ad5367ba39fdc094e192aee18bd63313867e13563863c369bef91d0384df4",
        },
        FingerprintVector {
            name: "second short hex",
            input: "0xdef",
            expected_hex: "ce93c634edfc7ab71170842ef379ae782c0293b8cfa5c34a26ef3104c8fc883d",
        },
        FingerprintVector {
            name: "uppercase is distinct",
            input: "0xABC",
            expected_hex: "b5fe9ee6ef0dbf821a41dd7ee30b6a0ef2be480cc7742925c98b6da3a9bf942a",
        },
        FingerprintVector {
            name: "longer hex",
            input: "0xabcdef1234567890",
            expected_hex: "8b9bab3665644da21ea9316890bc03b96f9c183daaca47a2e3aa61cddc45fbf5",
        },
        FingerprintVector {
            name: "single character",
            input: "a",
            expected_hex: "67155c1dd0d832fc076a01c3a1c34900348a5001c931c0a9ff1c384e236a8874",
        },
        FingerprintVector {
            name: "single space",
            input: " ",
            expected_hex: "f3ad30f1a7c3a6e6651061eacccea330775270b30c793f90d36d5d71d74c56bd",
        },
        FingerprintVector {
            name: "content identifier",
            input: "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG",
            expected_hex: "2a749c0f9777cdb2a1adc62dd34d9d041f81228e8ab86407e8437512adfd11fe",
        },
        FingerprintVector {
            name: "non-ascii",
            input: "été",
            expected_hex: "87efb6af6d4e660eb02245e44ddb7f71871f2b2450dd9981e954f9fe937bbc88",
        },
    ]
}

/// Get all call encoding vectors.
pub fn call_vectors() -> Vec<CallVector> {
    vec![
        CallVector {
            name: "request verification",
            caller: [0x01; 32],
            nonce: 1,
            call: Call::RequestVerification {
                hash: "0xabc".to_string(),
            },
            expected_hex: "a5000001582001010101010101010101010101010101010101010101010101010101010101010201030204653078616263",
        },
        CallVector {
            name: "reject with reason",
            caller: [0x42; 32],
            nonce: 42,
            call: Call::VerifyDocument {
                hash: "0xdef".to_string(),
                approve: false,
                reason: "bad scan".to_string(),
            },
            expected_hex: "a70000015820424242424242424242424242424242424242424242424242424242424242424202182a03030465307864656606f40768626164207363616e",
        },
    ]
}

/// Check every vector against this implementation.
///
/// Returns `(name, matches, detail)` per vector, where `detail` is the
/// computed hex or the encoding error.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    let fingerprints = all_vectors().into_iter().map(|v| {
        let hex = canonicalize(v.input).to_hex();
        (v.name.to_string(), hex == v.expected_hex, hex)
    });

    let calls = call_vectors().into_iter().map(|v| {
        let caller = Identity::from_bytes(v.caller);
        match canonical_call_bytes(&caller, v.nonce, &v.call) {
            Ok(bytes) => {
                let hex = hex::encode(bytes);
                (v.name.to_string(), hex == v.expected_hex, hex)
            }
            Err(e) => (v.name.to_string(), false, e.to_string()),
        }
    });

    fingerprints.chain(calls).collect()
}

/// All fingerprint vectors as pretty-printed JSON, for other implementations
/// to consume.
pub fn vectors_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&all_vectors())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_match() {
        for (name, ok, detail) in verify_all_vectors() {
            assert!(ok, "vector '{}' computed {}", name, detail);
        }
    }

    #[test]
    fn test_vector_names_unique() {
        let results = verify_all_vectors();
        let mut names: Vec<_> = results.iter().map(|(n, _, _)| n.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), results.len());
    }

    #[test]
    fn test_fingerprints_are_distinct() {
        let vectors = all_vectors();
        for (i, a) in vectors.iter().enumerate() {
            for b in &vectors[i + 1..] {
                assert_ne!(a.expected_hex, b.expected_hex, "{} vs {}", a.name, b.name);
            }
        }
    }

    #[test]
    fn test_vectors_json() {
        let json = vectors_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let array = parsed.as_array().unwrap();
        assert_eq!(array.len(), all_vectors().len());
        assert_eq!(array[1]["input"], "0xabc");
    }
}
