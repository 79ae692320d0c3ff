//! # Content Digest — Opaque Off-Chain References
//!
//! Defines [`ContentDigest`], the fixed-length content hash that task
//! records use to reference off-chain specification and result documents.
//!
//! The settlement core stores digests and compares them for equality; it
//! never fetches or validates the referenced content. Whether the bytes
//! behind a digest exist, parse, or satisfy the task specification is a
//! question for the parties and the dispute coordinator.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CoreError;

/// A fixed-length (32-byte) content hash referencing off-chain data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Compute the SHA-256 digest of arbitrary bytes.
    ///
    /// Convenience for producers of spec/result documents; the ledgers
    /// themselves only ever store the value.
    pub fn sha256(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Parse a digest from a 64-character lowercase hex string.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDigest`] for wrong length or non-hex
    /// characters.
    pub fn from_hex(hex: &str) -> Result<Self, CoreError> {
        if hex.len() != 64 {
            return Err(CoreError::InvalidDigest {
                value: hex.to_string(),
                reason: format!("expected 64 hex chars, got {}", hex.len()),
            });
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).map_err(|_| CoreError::InvalidDigest {
                value: hex.to_string(),
                reason: "digest is not valid UTF-8".to_string(),
            })?;
            bytes[i] = u8::from_str_radix(pair, 16).map_err(|_| CoreError::InvalidDigest {
                value: hex.to_string(),
                reason: format!("non-hex characters at position {}", i * 2),
            })?;
        }
        Ok(Self(bytes))
    }

    /// The raw 32-byte digest value.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_is_deterministic() {
        let a = ContentDigest::sha256(b"task spec v1");
        let b = ContentDigest::sha256(b"task spec v1");
        assert_eq!(a, b);
    }

    #[test]
    fn sha256_differs_on_different_input() {
        assert_ne!(
            ContentDigest::sha256(b"spec"),
            ContentDigest::sha256(b"result")
        );
    }

    #[test]
    fn hex_roundtrip() {
        let digest = ContentDigest::sha256(b"roundtrip");
        let hex = digest.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(ContentDigest::from_hex(&hex).unwrap(), digest);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(ContentDigest::from_hex("abcd").is_err());
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        let bad = "zz".repeat(32);
        assert!(ContentDigest::from_hex(&bad).is_err());
    }

    #[test]
    fn display_matches_hex() {
        let digest = ContentDigest::from_bytes([0xAB; 32]);
        assert_eq!(format!("{digest}"), "ab".repeat(32));
    }

    #[test]
    fn serde_roundtrip() {
        let digest = ContentDigest::sha256(b"serde");
        let json = serde_json::to_string(&digest).unwrap();
        let parsed: ContentDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(digest, parsed);
    }
}
