//! # trustkit-crypto — Keys, Signers, Resolvers
//!
//! Key material and the two cryptographic collaborator contracts the proof
//! engine consumes:
//!
//! - [`Signer`]: `sign(key_id, bytes)`. Private keys never leave the signer;
//!   callers only ever see signature bytes.
//! - [`VerificationMethodResolver`]: maps a verification-method identifier
//!   to public key material.
//!
//! [`InMemoryKeyStore`] and [`StaticResolver`] are the in-process
//! implementations used for development and tests. Remote KMS backends and
//! DID resolution implement the same traits outside this workspace.

pub mod ed25519;
pub mod error;
pub mod keystore;
pub mod resolver;
pub mod signer;

pub use ed25519::{Ed25519Signature, SigningKey, VerifyingKey};
pub use error::{CryptoError, ResolveError, SignerError};
pub use keystore::InMemoryKeyStore;
pub use resolver::{PublicKeyMaterial, StaticResolver, VerificationMethodResolver};
pub use signer::{KeyAlgorithm, Signer};
