//! Built-in Ed25519 proof suites and the plumbing they share.
//!
//! Both suites strip `proof` from the document before canonicalizing, and
//! both encode the signature as multibase base58btc in `proofValue`. They
//! differ in what is signed:
//!
//! | Suite | Signing input |
//! |---|---|
//! | `Ed25519Signature2020` | canonical document |
//! | `eddsa-jcs-2022` | `SHA-256(canonical proof options) \|\| SHA-256(canonical document)` |
//!
//! so proof parameters are covered by the signature only in the second.

mod ed25519_2020;
mod eddsa_jcs_2022;

pub use ed25519_2020::Ed25519Signature2020;
pub use eddsa_jcs_2022::EddsaJcs2022;

use std::sync::Arc;

use serde_json::{Map, Value};

use trustkit_core::{CanonicalBytes, Timestamp};
use trustkit_crypto::{
    Ed25519Signature, KeyAlgorithm, Signer, SignerError, VerificationMethodResolver,
};

use crate::error::{ProofError, VerificationOutcome};
use crate::proof::Proof;

const ED25519_ONLY: &[KeyAlgorithm] = &[KeyAlgorithm::Ed25519];

/// The document with its `proof` member removed.
pub(crate) fn unsecured(document: &Value) -> Result<Map<String, Value>, ProofError> {
    let mut obj = document
        .as_object()
        .cloned()
        .ok_or_else(|| ProofError::InvalidDocument("document must be a JSON object".to_string()))?;
    obj.remove("proof");
    Ok(obj)
}

pub(crate) fn canonical(map: Map<String, Value>) -> Result<CanonicalBytes, ProofError> {
    Ok(CanonicalBytes::from_value(&Value::Object(map))?)
}

/// Check the key algorithm, then sign `input` through the suite's signer.
pub(crate) async fn sign_input(
    suite: &str,
    signer: Option<&Arc<dyn Signer>>,
    supported: &[KeyAlgorithm],
    key_id: &str,
    input: &[u8],
) -> Result<Ed25519Signature, ProofError> {
    let signer = signer.ok_or_else(|| ProofError::SignerUnavailable(suite.to_string()))?;
    let algorithm = signer.key_algorithm(key_id).await?;
    if !supported.contains(&algorithm) {
        return Err(ProofError::UnsupportedAlgorithm {
            suite: suite.to_string(),
            algorithm,
        });
    }
    let raw = signer.sign(key_id, input).await?;
    Ed25519Signature::from_slice(&raw)
        .map_err(|e| ProofError::Signer(SignerError::Backend(e.to_string())))
}

/// Attach a finished proof to the unsecured document.
pub(crate) fn attach(mut unsecured: Map<String, Value>, proof: &Proof) -> Result<Value, ProofError> {
    let proof = serde_json::to_value(proof).map_err(|e| ProofError::InvalidDocument(e.to_string()))?;
    unsecured.insert("proof".to_string(), proof);
    Ok(Value::Object(unsecured))
}

pub(crate) fn created_or_now(created: Option<Timestamp>) -> Timestamp {
    created.unwrap_or_else(Timestamp::now)
}

/// Parse the proof, and check that it belongs to `suite`.
pub(crate) fn extract_proof(document: &Value, suite: &str) -> Result<Proof, VerificationOutcome> {
    let proof = Proof::from_document(document)
        .map_err(|e| VerificationOutcome::MalformedProof(e.to_string()))?
        .ok_or_else(|| VerificationOutcome::MalformedProof("document has no proof".to_string()))?;
    if proof.suite_id() != suite {
        return Err(VerificationOutcome::UnsupportedSuite(format!(
            "{} cannot verify {} proofs",
            suite,
            proof.suite_id()
        )));
    }
    Ok(proof)
}

/// Resolve the verification method and check `signature` over `input`.
pub(crate) async fn check_signature(
    resolver: &dyn VerificationMethodResolver,
    supported: &[KeyAlgorithm],
    proof: &Proof,
    input: &[u8],
) -> VerificationOutcome {
    let signature = match Ed25519Signature::from_multibase(&proof.proof_value) {
        Ok(sig) => sig,
        Err(e) => return VerificationOutcome::MalformedProof(format!("proofValue: {e}")),
    };
    let material = match resolver.resolve(&proof.verification_method).await {
        Ok(m) => m,
        Err(e) => return VerificationOutcome::UnresolvableVerificationMethod(e.to_string()),
    };
    if !supported.contains(&material.algorithm) {
        return VerificationOutcome::UnresolvableVerificationMethod(format!(
            "{} resolves to an unsupported {} key",
            proof.verification_method, material.algorithm
        ));
    }
    let key = match material.to_ed25519() {
        Ok(k) => k,
        Err(e) => return VerificationOutcome::UnresolvableVerificationMethod(e.to_string()),
    };
    match key.verify(input, &signature) {
        Ok(()) => VerificationOutcome::Valid,
        Err(e) => VerificationOutcome::InvalidSignature(e.to_string()),
    }
}
