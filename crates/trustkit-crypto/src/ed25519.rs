//! # Ed25519 Keys and Signatures
//!
//! Thin newtypes over `ed25519-dalek`.
//!
//! ## Security Invariant
//!
//! - [`SigningKey`] does not implement `Serialize` and its `Debug` output is
//!   redacted. The underlying dalek key zeroizes its secret on drop.
//! - Signatures leave this crate only as multibase base58btc (`proofValue`)
//!   or raw bytes. Public keys travel as raw bytes inside
//!   [`PublicKeyMaterial`](crate::PublicKeyMaterial).

use ed25519_dalek::{Signer as _, Verifier as _};
use zeroize::Zeroize;

use crate::error::CryptoError;

/// An Ed25519 private key.
pub struct SigningKey {
    inner: ed25519_dalek::SigningKey,
}

/// An Ed25519 public key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct VerifyingKey(ed25519_dalek::VerifyingKey);

/// An Ed25519 signature (64 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519Signature([u8; 64]);

// ---------------------------------------------------------------------------
// SigningKey
// ---------------------------------------------------------------------------

impl SigningKey {
    /// Generate a key from the operating system CSPRNG.
    pub fn generate() -> Self {
        let mut rng = rand_core::OsRng;
        Self {
            inner: ed25519_dalek::SigningKey::generate(&mut rng),
        }
    }

    /// Derive a key from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            inner: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// Derive a key from a seed slice, zeroizing the intermediate copy.
    pub fn from_seed_slice(seed: &[u8]) -> Result<Self, CryptoError> {
        if seed.len() != 32 {
            return Err(CryptoError::InvalidPublicKey(format!(
                "Ed25519 seed must be 32 bytes, got {}",
                seed.len()
            )));
        }
        let mut buf = [0u8; 32];
        buf.copy_from_slice(seed);
        let key = Self::from_seed(&buf);
        buf.zeroize();
        Ok(key)
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(self.inner.verifying_key())
    }

    /// Sign an arbitrary signing input.
    ///
    /// Proof suites build their input from canonical bytes; some of them
    /// hash and concatenate before signing, so this accepts raw bytes.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.inner.sign(message).to_bytes())
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey(<private>)")
    }
}

// ---------------------------------------------------------------------------
// VerifyingKey
// ---------------------------------------------------------------------------

impl VerifyingKey {
    /// Parse a public key from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidPublicKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        ed25519_dalek::VerifyingKey::from_bytes(&arr)
            .map(Self)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Lowercase hex. [`InMemoryKeyStore`](crate::InMemoryKeyStore) uses it
    /// as the default key id.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(self.0.as_bytes())
    }

    /// Verify a signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<(), CryptoError> {
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        self.0
            .verify(message, &sig)
            .map_err(|e| CryptoError::VerificationFailed(e.to_string()))
    }
}

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VerifyingKey({}...)", hex_prefix(self.0.as_bytes()))
    }
}

impl std::fmt::Display for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    /// Parse a signature from a slice, checking its length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 64] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidSignatureLength(bytes.len()))?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Render as multibase base58btc (`z...`), the `proofValue` encoding.
    pub fn to_multibase(&self) -> String {
        multibase::encode(multibase::Base::Base58Btc, self.0)
    }

    /// Parse from any multibase encoding.
    pub fn from_multibase(encoded: &str) -> Result<Self, CryptoError> {
        let (_base, raw) =
            multibase::decode(encoded).map_err(|e| CryptoError::Multibase(e.to_string()))?;
        Self::from_slice(&raw)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", hex_prefix(&self.0))
    }
}

// ---------------------------------------------------------------------------
// Hex utilities
// ---------------------------------------------------------------------------

fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_prefix(bytes: &[u8]) -> String {
    bytes_to_hex(&bytes[..bytes.len().min(4)])
}
