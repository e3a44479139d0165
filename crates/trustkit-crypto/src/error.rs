//! # Cryptographic Error Types
//!
//! One enum per contract: [`CryptoError`] for local key and signature
//! handling, [`SignerError`] for the signing collaborator, and
//! [`ResolveError`] for verification-method resolution.

use thiserror::Error;

use crate::signer::KeyAlgorithm;

/// Errors from local key and signature handling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Ed25519 signature verification failed.
    #[error("Ed25519 verification failed: {0}")]
    VerificationFailed(String),

    /// Signature bytes had the wrong length.
    #[error("invalid Ed25519 signature length: expected 64 bytes, got {0}")]
    InvalidSignatureLength(usize),

    /// Public key bytes were malformed.
    #[error("invalid Ed25519 public key: {0}")]
    InvalidPublicKey(String),

    /// Multibase decoding error.
    #[error("multibase decode error: {0}")]
    Multibase(String),
}

/// Failures reported by a [`Signer`](crate::Signer).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("key {key_id} uses unsupported algorithm {algorithm}")]
    UnsupportedAlgorithm {
        key_id: String,
        algorithm: KeyAlgorithm,
    },

    /// The key exists but has been disabled for signing.
    #[error("key is disabled: {0}")]
    KeyDisabled(String),

    /// Any other backend failure (network, HSM, throttling).
    #[error("signer backend error: {0}")]
    Backend(String),
}

/// Failures reported by a [`VerificationMethodResolver`](crate::VerificationMethodResolver).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("verification method not found: {0}")]
    NotFound(String),

    #[error("resolver backend error: {0}")]
    Backend(String),
}
