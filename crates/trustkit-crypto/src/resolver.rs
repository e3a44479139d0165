//! The verification-method resolution contract.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::ed25519::VerifyingKey;
use crate::error::{CryptoError, ResolveError};
use crate::signer::KeyAlgorithm;

/// Public key bytes tagged with their algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyMaterial {
    pub algorithm: KeyAlgorithm,
    pub bytes: Vec<u8>,
}

impl PublicKeyMaterial {
    pub fn ed25519(key: &VerifyingKey) -> Self {
        Self {
            algorithm: KeyAlgorithm::Ed25519,
            bytes: key.to_bytes().to_vec(),
        }
    }

    /// Interpret the material as an Ed25519 public key.
    pub fn to_ed25519(&self) -> Result<VerifyingKey, CryptoError> {
        if self.algorithm != KeyAlgorithm::Ed25519 {
            return Err(CryptoError::InvalidPublicKey(format!(
                "expected ed25519 key material, got {}",
                self.algorithm
            )));
        }
        VerifyingKey::from_slice(&self.bytes)
    }
}

/// Resolves a verification-method identifier (typically a DID URL) to key
/// material. DID method implementations live outside this workspace.
#[async_trait]
pub trait VerificationMethodResolver: Send + Sync {
    async fn resolve(&self, verification_method: &str) -> Result<PublicKeyMaterial, ResolveError>;
}

/// A resolver over a fixed in-memory map.
#[derive(Debug, Default)]
pub struct StaticResolver {
    methods: RwLock<HashMap<String, PublicKeyMaterial>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a verification method.
    pub fn insert(&self, verification_method: impl Into<String>, material: PublicKeyMaterial) {
        self.methods.write().insert(verification_method.into(), material);
    }

    /// Builder form of [`StaticResolver::insert`].
    pub fn with(self, verification_method: impl Into<String>, material: PublicKeyMaterial) -> Self {
        self.insert(verification_method, material);
        self
    }

    pub fn remove(&self, verification_method: &str) -> Option<PublicKeyMaterial> {
        self.methods.write().remove(verification_method)
    }
}

#[async_trait]
impl VerificationMethodResolver for StaticResolver {
    async fn resolve(&self, verification_method: &str) -> Result<PublicKeyMaterial, ResolveError> {
        self.methods
            .read()
            .get(verification_method)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(verification_method.to_string()))
    }
}
