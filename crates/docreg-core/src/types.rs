//! Strong type definitions for the registry.
//!
//! Identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte document fingerprint.
///
/// Produced by [`canonicalize`](crate::canonical::canonicalize) from the
/// externally supplied hash string. The all-zero value is reserved for the
/// empty input and never identifies a registered document.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Create a new Fingerprint from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Whether this is the reserved zero fingerprint.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The zero fingerprint (canonical form of the empty string).
    pub const ZERO: Self = Self([0u8; 32]);
}

impl Default for Fingerprint {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Fingerprint {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Fingerprint {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 32] = slice.try_into()?;
        Ok(Self(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_hex_roundtrip() {
        let fp = Fingerprint::from_bytes([0x42; 32]);
        let recovered = Fingerprint::from_hex(&fp.to_hex()).unwrap();
        assert_eq!(fp, recovered);
    }

    #[test]
    fn test_fingerprint_from_hex_rejects_short_input() {
        assert!(Fingerprint::from_hex("abcd").is_err());
    }

    #[test]
    fn test_fingerprint_display() {
        let fp = Fingerprint::from_bytes([0xab; 32]);
        assert_eq!(format!("{}", fp), "abababababababab");
    }

    #[test]
    fn test_zero_and_default() {
        assert!(Fingerprint::ZERO.is_zero());
        assert_eq!(Fingerprint::default(), Fingerprint::ZERO);
        assert!(!Fingerprint::from_bytes([1; 32]).is_zero());
    }

    #[test]
    fn test_try_from_slice() {
        let bytes = [7u8; 32];
        let fp = Fingerprint::try_from(&bytes[..]).unwrap();
        assert_eq!(fp.as_bytes(), &bytes);
        assert!(Fingerprint::try_from(&bytes[..31]).is_err());
    }
}
