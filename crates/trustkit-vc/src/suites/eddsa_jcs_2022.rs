//! `eddsa-jcs-2022`: a Data Integrity cryptosuite that signs the proof
//! options alongside the document.
//!
//! Signing input is the 64-byte concatenation
//! `SHA-256(JCS(proof options)) || SHA-256(JCS(document))`, where the proof
//! options are the proof object without `proofValue`. A document-level
//! `@context` is copied into the proof options.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use trustkit_core::sha256_digest;
use trustkit_crypto::{KeyAlgorithm, Signer, VerificationMethodResolver};

use super::{
    attach, canonical, check_signature, created_or_now, extract_proof, sign_input, unsecured,
    ED25519_ONLY,
};
use crate::error::{ProofError, VerificationOutcome};
use crate::proof::{Proof, DATA_INTEGRITY_PROOF};
use crate::suite::{ProofSuite, SigningContext};

pub struct EddsaJcs2022 {
    signer: Option<Arc<dyn Signer>>,
}

impl EddsaJcs2022 {
    pub const ID: &'static str = "eddsa-jcs-2022";

    pub fn new(signer: Arc<dyn Signer>) -> Self {
        Self {
            signer: Some(signer),
        }
    }

    pub fn verifier() -> Self {
        Self { signer: None }
    }
}

impl std::fmt::Debug for EddsaJcs2022 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EddsaJcs2022")
            .field("can_sign", &self.signer.is_some())
            .finish()
    }
}

fn hash_data(options: Map<String, Value>, body: Map<String, Value>) -> Result<Vec<u8>, ProofError> {
    let options_hash = sha256_digest(&canonical(options)?);
    let document_hash = sha256_digest(&canonical(body)?);
    let mut input = Vec::with_capacity(64);
    input.extend_from_slice(&options_hash.bytes);
    input.extend_from_slice(&document_hash.bytes);
    Ok(input)
}

#[async_trait]
impl ProofSuite for EddsaJcs2022 {
    fn id(&self) -> &str {
        Self::ID
    }

    fn supported_algorithms(&self) -> &[KeyAlgorithm] {
        ED25519_ONLY
    }

    async fn sign(&self, document: &Value, ctx: &SigningContext) -> Result<Value, ProofError> {
        let body = unsecured(document)?;
        let mut extra = Map::new();
        if let Some(context) = body.get("@context") {
            extra.insert("@context".to_string(), context.clone());
        }
        let mut proof = Proof {
            proof_type: DATA_INTEGRITY_PROOF.to_string(),
            cryptosuite: Some(Self::ID.to_string()),
            created: *created_or_now(ctx.created).as_datetime(),
            verification_method: ctx.verification_method.clone(),
            proof_purpose: ctx.proof_purpose,
            proof_value: String::new(),
            extra,
        };
        let mut options = match serde_json::to_value(&proof) {
            Ok(Value::Object(map)) => map,
            _ => return Err(ProofError::InvalidDocument("proof options".to_string())),
        };
        options.remove("proofValue");

        let input = hash_data(options, body.clone())?;
        let signature = sign_input(
            Self::ID,
            self.signer.as_ref(),
            ED25519_ONLY,
            &ctx.key_id,
            &input,
        )
        .await?;
        proof.proof_value = signature.to_multibase();
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
        // Hash the proof exactly as it appears in the document.
        let mut options = match document.get("proof") {
            Some(Value::Object(map)) => map.clone(),
            _ => return VerificationOutcome::MalformedProof("proof is not an object".to_string()),
        };
        options.remove("proofValue");
        let input = match unsecured(document).and_then(|body| hash_data(options, body)) {
            Ok(i) => i,
            Err(e) => return VerificationOutcome::MalformedProof(e.to_string()),
        };
        check_signature(resolver, ED25519_ONLY, &proof, &input).await
    }
}
