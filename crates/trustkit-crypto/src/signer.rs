//! The signing collaborator contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SignerError;

/// Key algorithms a signer may hold.
///
/// Only Ed25519 keys can be generated in-process. The other variants exist
/// so remote backends can report what they hold, and proof suites can
/// reject keys they cannot use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAlgorithm {
    Ed25519,
    Secp256k1,
    P256,
}

impl std::fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ed25519 => write!(f, "ed25519"),
            Self::Secp256k1 => write!(f, "secp256k1"),
            Self::P256 => write!(f, "p256"),
        }
    }
}

/// A backend that signs with keys it never exposes.
///
/// Calls are suspension points: a remote KMS may take a network round
/// trip. Implementations must be safe to share across tasks.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Sign `data` with the identified key.
    async fn sign(&self, key_id: &str, data: &[u8]) -> Result<Vec<u8>, SignerError>;

    /// Report the algorithm of the identified key.
    async fn key_algorithm(&self, key_id: &str) -> Result<KeyAlgorithm, SignerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_serde_lowercase() {
        let json = serde_json::to_string(&KeyAlgorithm::P256).unwrap();
        assert_eq!(json, "\"p256\"");
        assert_eq!(KeyAlgorithm::Ed25519.to_string(), "ed25519");
    }
}
