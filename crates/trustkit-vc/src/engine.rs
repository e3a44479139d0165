//! # Proof Engine
//!
//! Routes sign and verify requests to registered [`ProofSuite`] providers.
//! The registry capability for a suite is its id, so several providers
//! (for example a software signer and a KMS-backed one) can serve the
//! same suite.
//!
//! - **Signing** runs a [`FallbackChain`] over every provider of the
//!   requested suite in registration order.
//! - **Verification** picks one provider with
//!   [`ProviderRegistry::select_provider`] using the engine's preference
//!   list. All providers of a suite verify identically, so no fallback is
//!   needed.

use std::sync::Arc;

use serde_json::Value;

use trustkit_crypto::VerificationMethodResolver;
use trustkit_registry::{FallbackChain, ProviderMetadata, ProviderRegistry, RegistryError};

use crate::credential::VerifiableCredential;
use crate::error::{ProofError, VerificationOutcome};
use crate::proof::Proof;
use crate::suite::{ProofSuite, SigningContext};

/// Suite dispatcher over a provider registry.
#[derive(Debug, Default)]
pub struct ProofEngine {
    suites: ProviderRegistry<dyn ProofSuite>,
    preferences: Vec<String>,
}

impl ProofEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider ids or provider names to prefer when verifying.
    pub fn with_preferences(mut self, preferences: Vec<String>) -> Self {
        self.preferences = preferences;
        self
    }

    /// Register a suite provider. The suite's id is added to the metadata's
    /// capabilities.
    pub fn register(
        &self,
        metadata: ProviderMetadata,
        suite: Arc<dyn ProofSuite>,
    ) -> Result<(), RegistryError> {
        let metadata = metadata.with_capability(suite.id());
        self.suites.register(metadata, suite)
    }

    /// Register a suite under its own id, with provider name `software`.
    pub fn register_default(&self, suite: Arc<dyn ProofSuite>) -> Result<(), RegistryError> {
        let id = suite.id().to_string();
        self.register(ProviderMetadata::new(id.clone(), id, "software"), suite)
    }

    pub fn unregister(&self, provider_id: &str) -> bool {
        self.suites.unregister(provider_id).is_some()
    }

    pub fn registry(&self) -> &ProviderRegistry<dyn ProofSuite> {
        &self.suites
    }

    /// Distinct suite ids with at least one provider.
    pub fn supported_suites(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .suites
            .ids()
            .iter()
            .filter_map(|id| self.suites.get(id))
            .map(|suite| suite.id().to_string())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Sign `document` with the named suite.
    ///
    /// # Errors
    ///
    /// [`ProofError::UnsupportedSuite`] if nothing serves `suite_id`. With
    /// one provider its error is returned as-is; with several, a failure of
    /// all of them is [`ProofError::AllProvidersFailed`].
    pub async fn sign(
        &self,
        document: &Value,
        suite_id: &str,
        ctx: &SigningContext,
    ) -> Result<Value, ProofError> {
        let providers = self.suites.find_by_capability(suite_id);
        let chain = FallbackChain::from_registered(providers)
            .map_err(|_| ProofError::UnsupportedSuite(suite_id.to_string()))?;
        let result = chain
            .execute(|suite| async move { suite.sign(document, ctx).await })
            .await;
        match result {
            Ok(signed) => {
                tracing::debug!(suite = suite_id, verification_method = %ctx.verification_method, "document signed");
                Ok(signed)
            }
            Err(failed) if failed.errors.len() == 1 => Err(failed
                .into_last_error()
                .unwrap_or_else(|| ProofError::UnsupportedSuite(suite_id.to_string()))),
            Err(failed) => {
                let attempted = failed.attempted.clone();
                let last_error = failed
                    .into_last_error()
                    .unwrap_or_else(|| ProofError::UnsupportedSuite(suite_id.to_string()));
                Err(ProofError::AllProvidersFailed {
                    attempted,
                    last_error: Box::new(last_error),
                })
            }
        }
    }

    /// Verify the proof attached to `document` with the suite it names.
    pub async fn verify(
        &self,
        document: &Value,
        resolver: &dyn VerificationMethodResolver,
    ) -> VerificationOutcome {
        let proof = match Proof::from_document(document) {
            Ok(Some(p)) => p,
            Ok(None) => return VerificationOutcome::MalformedProof("document has no proof".to_string()),
            Err(e) => return VerificationOutcome::MalformedProof(e.to_string()),
        };
        let suite_id = proof.suite_id();
        let preferences: Vec<&str> = self.preferences.iter().map(String::as_str).collect();
        let Some(provider) = self.suites.select_provider(suite_id, &preferences) else {
            return VerificationOutcome::UnsupportedSuite(suite_id.to_string());
        };
        let outcome = provider.instance.verify(document, resolver).await;
        if !outcome.is_valid() {
            tracing::debug!(suite = suite_id, provider = %provider.metadata.id, %outcome, "proof rejected");
        }
        outcome
    }

    /// Sign a typed credential, returning it with the proof attached.
    pub async fn sign_credential(
        &self,
        credential: &VerifiableCredential,
        suite_id: &str,
        ctx: &SigningContext,
    ) -> Result<VerifiableCredential, ProofError> {
        let document = credential.to_value()?;
        let signed = self.sign(&document, suite_id, ctx).await?;
        Ok(VerifiableCredential::from_value(signed)?)
    }

    /// Verify a typed credential through its serialized form. For JSON
    /// received from elsewhere use [`verify`](Self::verify) on the document
    /// itself, since re-serializing may normalize signed members.
    pub async fn verify_credential(
        &self,
        credential: &VerifiableCredential,
        resolver: &dyn VerificationMethodResolver,
    ) -> VerificationOutcome {
        match credential.to_value() {
            Ok(document) => self.verify(&document, resolver).await,
            Err(e) => VerificationOutcome::MalformedProof(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suites::testing::{keys, VM};
    use crate::suites::{EddsaJcs2022, Ed25519Signature2020};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use trustkit_crypto::{KeyAlgorithm, SignerError};

    /// A suite whose signer is always down.
    struct Broken {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ProofSuite for Broken {
        fn id(&self) -> &str {
            Ed25519Signature2020::ID
        }

        fn supported_algorithms(&self) -> &[KeyAlgorithm] {
            &[KeyAlgorithm::Ed25519]
        }

        async fn sign(&self, _document: &Value, _ctx: &SigningContext) -> Result<Value, ProofError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ProofError::Signer(SignerError::Backend("hsm offline".to_string())))
        }

        async fn verify(
            &self,
            _document: &Value,
            _resolver: &dyn VerificationMethodResolver,
        ) -> VerificationOutcome {
            VerificationOutcome::InvalidSignature("broken verifier".to_string())
        }
    }

    fn credential() -> VerifiableCredential {
        let mut vc = VerifiableCredential::new(
            "did:example:issuer",
            json!({"id": "did:example:alice", "memberOf": "Example Co-op"}),
        );
        vc.id = Some("urn:uuid:engine-test".to_string());
        vc
    }

    fn engine() -> (ProofEngine, trustkit_crypto::StaticResolver) {
        let (store, resolver) = keys();
        let engine = ProofEngine::new();
        engine
            .register_default(Arc::new(Ed25519Signature2020::new(store.clone())))
            .unwrap();
        engine
            .register_default(Arc::new(EddsaJcs2022::new(store)))
            .unwrap();
        (engine, resolver)
    }

    #[tokio::test]
    async fn round_trip_each_suite() {
        let (engine, resolver) = engine();
        for suite in [Ed25519Signature2020::ID, EddsaJcs2022::ID] {
            let signed = engine
                .sign_credential(&credential(), suite, &SigningContext::new(VM, VM))
                .await
                .unwrap();
            assert!(signed.proof.is_some());
            assert_eq!(
                engine.verify_credential(&signed, &resolver).await,
                VerificationOutcome::Valid,
                "suite {suite}"
            );
        }
    }

    #[tokio::test]
    async fn unknown_suite_rejected_on_both_paths() {
        let (engine, resolver) = engine();
        let doc = credential().to_value().unwrap();
        let err = engine
            .sign(&doc, "BbsBlsSignature2020", &SigningContext::new(VM, VM))
            .await
            .unwrap_err();
        assert_eq!(err, ProofError::UnsupportedSuite("BbsBlsSignature2020".to_string()));

        let signed = engine
            .sign(&doc, Ed25519Signature2020::ID, &SigningContext::new(VM, VM))
            .await
            .unwrap();
        engine.unregister(Ed25519Signature2020::ID);
        assert!(matches!(
            engine.verify(&signed, &resolver).await,
            VerificationOutcome::UnsupportedSuite(_)
        ));
    }

    #[tokio::test]
    async fn signing_falls_back_to_next_provider() {
        let (store, resolver) = keys();
        let engine = ProofEngine::new();
        let broken = Arc::new(Broken {
            calls: AtomicUsize::new(0),
        });
        engine
            .register(ProviderMetadata::new("hsm", "HSM", "aws-cloudhsm"), broken.clone())
            .unwrap();
        engine
            .register(
                ProviderMetadata::new("soft", "Software", "software"),
                Arc::new(Ed25519Signature2020::new(store)),
            )
            .unwrap();
        let engine = engine.with_preferences(vec!["software".to_string()]);

        let doc = credential().to_value().unwrap();
        let signed = engine
            .sign(&doc, Ed25519Signature2020::ID, &SigningContext::new(VM, VM))
            .await
            .unwrap();
        assert_eq!(broken.calls.load(Ordering::SeqCst), 1);
        // Verification picks the preferred software provider, not the
        // broken one registered first.
        assert!(engine.verify(&signed, &resolver).await.is_valid());
    }

    #[tokio::test]
    async fn all_providers_failing_is_reported() {
        let engine = ProofEngine::new();
        for id in ["a", "b"] {
            engine
                .register(
                    ProviderMetadata::new(id, id, "hsm"),
                    Arc::new(Broken {
                        calls: AtomicUsize::new(0),
                    }),
                )
                .unwrap();
        }
        let err = engine
            .sign(&json!({}), Ed25519Signature2020::ID, &SigningContext::new(VM, VM))
            .await
            .unwrap_err();
        match err {
            ProofError::AllProvidersFailed {
                attempted,
                last_error,
            } => {
                assert_eq!(attempted, vec!["a", "b"]);
                assert!(matches!(*last_error, ProofError::Signer(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn single_provider_error_passes_through() {
        let engine = ProofEngine::new();
        engine
            .register_default(Arc::new(Ed25519Signature2020::verifier()))
            .unwrap();
        let err = engine
            .sign(&json!({}), Ed25519Signature2020::ID, &SigningContext::new(VM, VM))
            .await
            .unwrap_err();
        assert!(matches!(err, ProofError::SignerUnavailable(_)));
    }

    #[tokio::test]
    async fn unsigned_document_is_malformed() {
        let (engine, resolver) = engine();
        let outcome = engine.verify(&json!({"a": 1}), &resolver).await;
        assert!(matches!(outcome, VerificationOutcome::MalformedProof(_)));
    }

    #[test]
    fn supported_suites_are_deduplicated() {
        let (engine, _) = engine();
        engine
            .register(
                ProviderMetadata::new("second", "second", "kms"),
                Arc::new(EddsaJcs2022::verifier()),
            )
            .unwrap();
        assert_eq!(
            engine.supported_suites(),
            vec!["Ed25519Signature2020".to_string(), "eddsa-jcs-2022".to_string()]
        );
    }
}
