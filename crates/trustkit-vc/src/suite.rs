//! The proof-suite contract.

use async_trait::async_trait;
use serde_json::Value;

use trustkit_core::Timestamp;
use trustkit_crypto::{KeyAlgorithm, VerificationMethodResolver};

use crate::error::{ProofError, VerificationOutcome};
use crate::proof::ProofPurpose;

/// Caller-supplied parameters for one signing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    /// Key handle understood by the suite's signer.
    pub key_id: String,
    /// DID URL written into the proof for verifiers to resolve.
    pub verification_method: String,
    pub proof_purpose: ProofPurpose,
    /// Proof creation time; defaults to now.
    pub created: Option<Timestamp>,
}

impl SigningContext {
    pub fn new(key_id: impl Into<String>, verification_method: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            verification_method: verification_method.into(),
            proof_purpose: ProofPurpose::AssertionMethod,
            created: None,
        }
    }

    pub fn with_purpose(mut self, purpose: ProofPurpose) -> Self {
        self.proof_purpose = purpose;
        self
    }

    pub fn with_created(mut self, created: Timestamp) -> Self {
        self.created = Some(created);
        self
    }
}

/// A named signing/verification recipe.
///
/// Suites operate on plain JSON documents. `sign` returns a copy of the
/// document with a `proof` member attached (replacing any existing one);
/// `verify` never mutates its input.
#[async_trait]
pub trait ProofSuite: Send + Sync {
    /// Suite identifier, e.g. `Ed25519Signature2020`. Used as the registry
    /// capability.
    fn id(&self) -> &str;

    /// Key algorithms this suite can sign and verify with.
    fn supported_algorithms(&self) -> &[KeyAlgorithm];

    async fn sign(&self, document: &Value, ctx: &SigningContext) -> Result<Value, ProofError>;

    async fn verify(
        &self,
        document: &Value,
        resolver: &dyn VerificationMethodResolver,
    ) -> VerificationOutcome;
}
