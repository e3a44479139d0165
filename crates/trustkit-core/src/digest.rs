//! # Content Digest — Content-Addressed Identifiers
//!
//! Defines [`ContentDigest`] and [`DigestAlgorithm`].
//!
//! ## Security Invariant
//!
//! [`sha256_digest()`] accepts only `&CanonicalBytes`, so every digest in the
//! system is produced through the canonicalization pipeline.
//!
//! ## Textual Form
//!
//! A digest renders as a multibase string: a one-character encoding tag
//! followed by the encoded hash bytes. trustkit always emits base58btc
//! (tag `z`), and accepts any multibase encoding on parse.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::DigestError;

/// The hash algorithm used to produce a content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-256.
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content-addressed digest with its algorithm tag.
///
/// Immutable and freely shareable; two digests are equal iff the canonical
/// bytes they were computed from are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Create a content digest from raw bytes and algorithm.
    pub fn new(algorithm: DigestAlgorithm, bytes: [u8; 32]) -> Self {
        Self { algorithm, bytes }
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Render the digest as a base58btc multibase string (`z...`).
    pub fn to_multibase(&self) -> String {
        multibase::encode(multibase::Base::Base58Btc, self.bytes)
    }

    /// Parse a SHA-256 digest from any multibase encoding.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::EncodingFailed`] if the string is not valid
    /// multibase or does not decode to exactly 32 bytes.
    pub fn from_multibase(encoded: &str) -> Result<Self, DigestError> {
        let (_base, raw) =
            multibase::decode(encoded).map_err(|e| DigestError::EncodingFailed(e.to_string()))?;
        let bytes: [u8; 32] = raw.as_slice().try_into().map_err(|_| {
            DigestError::EncodingFailed(format!("expected 32 digest bytes, got {}", raw.len()))
        })?;
        Ok(Self::new(DigestAlgorithm::Sha256, bytes))
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_multibase())
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
///
/// Stateless: a fresh hasher per call, nothing shared between threads.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    ContentDigest::new(DigestAlgorithm::Sha256, sha256_raw(data.as_bytes()))
}

/// SHA-256 over opaque bytes. Crate-internal: public callers go through
/// [`sha256_digest()`] or the [`DigestEngine`](crate::DigestEngine).
pub(crate) fn sha256_raw(data: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    bytes
}
