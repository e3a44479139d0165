//! # In-Memory Key Store
//!
//! Process-local [`Signer`] backed by `ed25519-dalek`. Suitable for
//! development and tests; production deployments put a KMS behind the same
//! trait.
//!
//! Key identifiers default to the hex-encoded public key. Disabled keys
//! still resolve for verification but refuse to sign.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::ed25519::{SigningKey, VerifyingKey};
use crate::error::SignerError;
use crate::resolver::PublicKeyMaterial;
use crate::signer::{KeyAlgorithm, Signer};

struct KeyEntry {
    signing_key: SigningKey,
    algorithm: KeyAlgorithm,
    enabled: bool,
}

/// In-process Ed25519 key store.
#[derive(Default)]
pub struct InMemoryKeyStore {
    keys: RwLock<HashMap<String, KeyEntry>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh key and return its identifier.
    pub fn generate(&self, algorithm: KeyAlgorithm) -> Result<String, SignerError> {
        let signing_key = match algorithm {
            KeyAlgorithm::Ed25519 => SigningKey::generate(),
            other => return Err(unsupported("<new>", other)),
        };
        let key_id = signing_key.verifying_key().to_hex();
        self.insert(key_id.clone(), signing_key, algorithm);
        Ok(key_id)
    }

    /// Import a key from a 32-byte seed under the default identifier.
    pub fn import(&self, algorithm: KeyAlgorithm, seed: &[u8]) -> Result<String, SignerError> {
        let signing_key = seed_to_key(algorithm, seed)?;
        let key_id = signing_key.verifying_key().to_hex();
        self.insert(key_id.clone(), signing_key, algorithm);
        Ok(key_id)
    }

    /// Import a key from a seed under a caller-chosen identifier, such as a
    /// verification-method URL. Replaces any existing key with that id.
    pub fn import_with_id(
        &self,
        key_id: impl Into<String>,
        algorithm: KeyAlgorithm,
        seed: &[u8],
    ) -> Result<(), SignerError> {
        let signing_key = seed_to_key(algorithm, seed)?;
        self.insert(key_id.into(), signing_key, algorithm);
        Ok(())
    }

    /// Prevent further signing with a key. Verification material remains
    /// available.
    pub fn disable(&self, key_id: &str) -> Result<(), SignerError> {
        let mut keys = self.keys.write();
        let entry = keys
            .get_mut(key_id)
            .ok_or_else(|| SignerError::KeyNotFound(key_id.to_string()))?;
        entry.enabled = false;
        tracing::debug!(key_id, "signing key disabled");
        Ok(())
    }

    pub fn verifying_key(&self, key_id: &str) -> Result<VerifyingKey, SignerError> {
        self.keys
            .read()
            .get(key_id)
            .map(|e| e.signing_key.verifying_key())
            .ok_or_else(|| SignerError::KeyNotFound(key_id.to_string()))
    }

    /// Public key material for registering with a resolver.
    pub fn public_material(&self, key_id: &str) -> Result<PublicKeyMaterial, SignerError> {
        let keys = self.keys.read();
        let entry = keys
            .get(key_id)
            .ok_or_else(|| SignerError::KeyNotFound(key_id.to_string()))?;
        Ok(PublicKeyMaterial {
            algorithm: entry.algorithm,
            bytes: entry.signing_key.verifying_key().to_bytes().to_vec(),
        })
    }

    pub fn list_keys(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.keys.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn insert(&self, key_id: String, signing_key: SigningKey, algorithm: KeyAlgorithm) {
        self.keys.write().insert(
            key_id,
            KeyEntry {
                signing_key,
                algorithm,
                enabled: true,
            },
        );
    }
}

fn seed_to_key(algorithm: KeyAlgorithm, seed: &[u8]) -> Result<SigningKey, SignerError> {
    match algorithm {
        KeyAlgorithm::Ed25519 => {
            SigningKey::from_seed_slice(seed).map_err(|e| SignerError::Backend(e.to_string()))
        }
        other => Err(unsupported("<import>", other)),
    }
}

fn unsupported(key_id: &str, algorithm: KeyAlgorithm) -> SignerError {
    SignerError::UnsupportedAlgorithm {
        key_id: key_id.to_string(),
        algorithm,
    }
}

impl std::fmt::Debug for InMemoryKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryKeyStore")
            .field("key_ids", &self.list_keys())
            .finish()
    }
}

#[async_trait]
impl Signer for InMemoryKeyStore {
    async fn sign(&self, key_id: &str, data: &[u8]) -> Result<Vec<u8>, SignerError> {
        let keys = self.keys.read();
        let entry = keys
            .get(key_id)
            .ok_or_else(|| SignerError::KeyNotFound(key_id.to_string()))?;
        if !entry.enabled {
            return Err(SignerError::KeyDisabled(key_id.to_string()));
        }
        Ok(entry.signing_key.sign(data).as_bytes().to_vec())
    }

    async fn key_algorithm(&self, key_id: &str) -> Result<KeyAlgorithm, SignerError> {
        self.keys
            .read()
            .get(key_id)
            .map(|e| e.algorithm)
            .ok_or_else(|| SignerError::KeyNotFound(key_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ed25519::Ed25519Signature;

    #[tokio::test]
    async fn generated_key_signs_and_verifies() {
        let store = InMemoryKeyStore::new();
        let key_id = store.generate(KeyAlgorithm::Ed25519).unwrap();
        assert_eq!(key_id.len(), 64);

        let raw = store.sign(&key_id, b"hello").await.unwrap();
        let sig = Ed25519Signature::from_slice(&raw).unwrap();
        store
            .verifying_key(&key_id)
            .unwrap()
            .verify(b"hello", &sig)
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_key_is_key_not_found() {
        let store = InMemoryKeyStore::new();
        let err = store.sign("missing", b"x").await.unwrap_err();
        assert_eq!(err, SignerError::KeyNotFound("missing".to_string()));
        assert!(store.key_algorithm("missing").await.is_err());
    }

    #[tokio::test]
    async fn disabled_key_refuses_to_sign() {
        let store = InMemoryKeyStore::new();
        let key_id = store.import(KeyAlgorithm::Ed25519, &[5u8; 32]).unwrap();
        store.disable(&key_id).unwrap();
        let err = store.sign(&key_id, b"x").await.unwrap_err();
        assert!(matches!(err, SignerError::KeyDisabled(_)));
        // Public material stays available for verification.
        assert!(store.public_material(&key_id).is_ok());
    }

    #[tokio::test]
    async fn import_with_id_uses_given_identifier() {
        let store = InMemoryKeyStore::new();
        store
            .import_with_id("did:example:issuer#key-1", KeyAlgorithm::Ed25519, &[1u8; 32])
            .unwrap();
        assert_eq!(
            store.key_algorithm("did:example:issuer#key-1").await.unwrap(),
            KeyAlgorithm::Ed25519
        );
        assert_eq!(store.list_keys(), vec!["did:example:issuer#key-1".to_string()]);
    }

    #[test]
    fn non_ed25519_generation_is_unsupported() {
        let store = InMemoryKeyStore::new();
        let err = store.generate(KeyAlgorithm::Secp256k1).unwrap_err();
        assert!(matches!(err, SignerError::UnsupportedAlgorithm { .. }));
    }

    #[test]
    fn debug_lists_ids_only() {
        let store = InMemoryKeyStore::new();
        store.import_with_id("k", KeyAlgorithm::Ed25519, &[2u8; 32]).unwrap();
        let dbg = format!("{store:?}");
        assert!(dbg.contains("\"k\""));
    }
}
