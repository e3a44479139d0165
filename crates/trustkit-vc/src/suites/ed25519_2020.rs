//! `Ed25519Signature2020`: Ed25519 over the canonical document.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use trustkit_crypto::{KeyAlgorithm, Signer, VerificationMethodResolver};

use super::{
    attach, canonical, check_signature, created_or_now, extract_proof, sign_input, unsecured,
    ED25519_ONLY,
};
use crate::error::{ProofError, VerificationOutcome};
use crate::proof::Proof;
use crate::suite::{ProofSuite, SigningContext};

/// The legacy Ed25519 suite. Proof options are not signed.
pub struct Ed25519Signature2020 {
    signer: Option<Arc<dyn Signer>>,
}

impl Ed25519Signature2020 {
    pub const ID: &'static str = "Ed25519Signature2020";

    pub fn new(signer: Arc<dyn Signer>) -> Self {
        Self {
            signer: Some(signer),
        }
    }

    /// An instance that can verify but not sign.
    pub fn verifier() -> Self {
        Self { signer: None }
    }
}

impl std::fmt::Debug for Ed25519Signature2020 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Signature2020")
            .field("can_sign", &self.signer.is_some())
            .finish()
    }
}

#[async_trait]
impl ProofSuite for Ed25519Signature2020 {
    fn id(&self) -> &str {
        Self::ID
    }

    fn supported_algorithms(&self) -> &[KeyAlgorithm] {
        ED25519_ONLY
    }

    async fn sign(&self, document: &Value, ctx: &SigningContext) -> Result<Value, ProofError> {
        let body = unsecured(document)?;
        let input = canonical(body.clone())?;
        let signature = sign_input(
            Self::ID,
            self.signer.as_ref(),
            ED25519_ONLY,
            &ctx.key_id,
            input.as_bytes(),
        )
        .await?;
        let proof = Proof {
            proof_type: Self::ID.to_string(),
            cryptosuite: None,
            created: *created_or_now(ctx.created).as_datetime(),
            verification_method: ctx.verification_method.clone(),
            proof_purpose: ctx.proof_purpose,
            proof_value: signature.to_multibase(),
            extra: Map::new(),
        };
        attach(body, &proof)
    }

    async fn verify(
        &self,
        document: &Value,
        resolver: &dyn VerificationMethodResolver,
    ) -> VerificationOutcome {
        let proof = match extract_proof(document, Self::ID) {
            Ok(p) => p,
            Err(outcome) => return outcome,
        };
        let input = match unsecured(document).and_then(canonical) {
            Ok(c) => c,
            Err(e) => return VerificationOutcome::MalformedProof(e.to_string()),
        };
        check_signature(resolver, ED25519_ONLY, &proof, input.as_bytes()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suites::testing::{keys, p256_resolver, Secp256k1Signer, VM};
    use serde_json::json;
    use trustkit_core::Timestamp;
    use trustkit_crypto::StaticResolver;

    fn doc() -> Value {
        json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiableCredential"],
            "issuer": "did:example:issuer",
            "credentialSubject": {"id": "did:example:alice", "degree": "BSc"}
        })
    }

    fn ctx() -> SigningContext {
        SigningContext::new(VM, VM).with_created(Timestamp::parse("2026-01-15T12:00:00Z").unwrap())
    }

    #[tokio::test]
    async fn sign_then_verify() {
        let (store, resolver) = keys();
        let suite = Ed25519Signature2020::new(store);
        let signed = suite.sign(&doc(), &ctx()).await.unwrap();
        assert_eq!(signed["proof"]["type"], "Ed25519Signature2020");
        assert!(signed["proof"]["proofValue"].as_str().unwrap().starts_with('z'));
        assert_eq!(suite.verify(&signed, &resolver).await, VerificationOutcome::Valid);
    }

    #[tokio::test]
    async fn proof_params_are_not_signed() {
        let (store, resolver) = keys();
        let suite = Ed25519Signature2020::new(store);
        let mut signed = suite.sign(&doc(), &ctx()).await.unwrap();
        signed["proof"]["created"] = json!("2030-01-01T00:00:00Z");
        assert!(suite.verify(&signed, &resolver).await.is_valid());
    }

    #[tokio::test]
    async fn tampered_subject_fails() {
        let (store, resolver) = keys();
        let suite = Ed25519Signature2020::new(store);
        let mut signed = suite.sign(&doc(), &ctx()).await.unwrap();
        signed["credentialSubject"]["degree"] = json!("PhD");
        assert!(matches!(
            suite.verify(&signed, &resolver).await,
            VerificationOutcome::InvalidSignature(_)
        ));
    }

    #[tokio::test]
    async fn unknown_method_is_unresolvable() {
        let (store, _) = keys();
        let suite = Ed25519Signature2020::new(store);
        let signed = suite.sign(&doc(), &ctx()).await.unwrap();
        assert!(matches!(
            suite.verify(&signed, &StaticResolver::new()).await,
            VerificationOutcome::UnresolvableVerificationMethod(_)
        ));
        assert!(matches!(
            suite.verify(&signed, &p256_resolver()).await,
            VerificationOutcome::UnresolvableVerificationMethod(_)
        ));
    }

    #[tokio::test]
    async fn garbage_proof_value_is_malformed() {
        let (store, resolver) = keys();
        let suite = Ed25519Signature2020::new(store);
        let mut signed = suite.sign(&doc(), &ctx()).await.unwrap();
        signed["proof"]["proofValue"] = json!("!!!");
        assert!(matches!(
            suite.verify(&signed, &resolver).await,
            VerificationOutcome::MalformedProof(_)
        ));
    }

    #[tokio::test]
    async fn missing_proof_is_malformed() {
        let (_, resolver) = keys();
        let outcome = Ed25519Signature2020::verifier().verify(&doc(), &resolver).await;
        assert!(matches!(outcome, VerificationOutcome::MalformedProof(_)));
    }

    #[tokio::test]
    async fn non_ed25519_signer_rejected() {
        let suite = Ed25519Signature2020::new(Arc::new(Secp256k1Signer));
        let err = suite.sign(&doc(), &ctx()).await.unwrap_err();
        assert_eq!(
            err,
            ProofError::UnsupportedAlgorithm {
                suite: "Ed25519Signature2020".to_string(),
                algorithm: KeyAlgorithm::Secp256k1,
            }
        );
    }

    #[tokio::test]
    async fn verifier_only_instance_cannot_sign() {
        let err = Ed25519Signature2020::verifier()
            .sign(&doc(), &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, ProofError::SignerUnavailable(_)));
    }

    #[tokio::test]
    async fn non_object_document_rejected() {
        let (store, _) = keys();
        let err = Ed25519Signature2020::new(store)
            .sign(&json!([1, 2]), &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, ProofError::InvalidDocument(_)));
    }

    #[tokio::test]
    async fn resigning_replaces_proof() {
        let (store, resolver) = keys();
        let suite = Ed25519Signature2020::new(store);
        let once = suite.sign(&doc(), &ctx()).await.unwrap();
        let twice = suite.sign(&once, &ctx()).await.unwrap();
        assert_eq!(once, twice);
        assert!(suite.verify(&twice, &resolver).await.is_valid());
    }
}
