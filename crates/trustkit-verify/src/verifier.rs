//! # Verification Orchestrator
//!
//! Runs the verification stages against one credential and folds their
//! results into a [`VerificationResult`].
//!
//! Stages run in the order schema, proof, expiration, revocation, trust.
//! Schema validation comes first because it is the cheapest. In
//! [`ShortCircuit`](crate::VerificationMode::ShortCircuit) mode the first
//! failure is returned. In `CollectAll` mode every enabled stage runs,
//! except that a proof failure still ends the run.
//!
//! Collaborators (proof engine, resolver, schema validators, status lists,
//! trust policy) are injected; the verifier owns no global state.

use std::sync::Arc;

use serde_json::Value;

use trustkit_core::Timestamp;
use trustkit_crypto::VerificationMethodResolver;
use trustkit_schema::{SchemaFormat, SchemaValidatorRegistry};
use trustkit_status::StatusListManager;
use trustkit_vc::{ProofEngine, VerifiableCredential};

use crate::config::VerificationConfig;
use crate::error::VerificationError;
use crate::policy::TrustPolicy;
use crate::result::{VerificationFailure, VerificationResult, VerificationStage};

/// Composes the proof engine, schema validators, status lists and trust
/// policy into one pass/fail decision.
pub struct CredentialVerifier {
    proofs: Arc<ProofEngine>,
    resolver: Arc<dyn VerificationMethodResolver>,
    schemas: SchemaValidatorRegistry,
    status: Option<Arc<StatusListManager>>,
    trust: Option<Arc<dyn TrustPolicy>>,
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("proofs", &self.proofs)
            .field("schemas", &self.schemas)
            .field("status_lists", &self.status.is_some())
            .field("trust_policy", &self.trust.is_some())
            .finish()
    }
}

/// Collected stage results for one run.
struct Run {
    short_circuit: bool,
    failures: Vec<VerificationFailure>,
    warnings: Vec<String>,
}

impl Run {
    /// Record a failure. Returns true if the run should stop.
    fn fail(&mut self, failure: VerificationFailure) -> bool {
        tracing::debug!(stage = ?failure.stage(), %failure, "verification stage failed");
        self.failures.push(failure);
        self.short_circuit
    }

    fn finish(self) -> VerificationResult {
        VerificationResult::from_parts(self.failures, self.warnings)
    }
}

impl CredentialVerifier {
    /// A verifier with the built-in schema validators, no status lists and
    /// no trust policy.
    pub fn new(proofs: Arc<ProofEngine>, resolver: Arc<dyn VerificationMethodResolver>) -> Self {
        Self {
            proofs,
            resolver,
            schemas: SchemaValidatorRegistry::with_defaults(),
            status: None,
            trust: None,
        }
    }

    pub fn with_schema_validators(mut self, schemas: SchemaValidatorRegistry) -> Self {
        self.schemas = schemas;
        self
    }

    pub fn with_status_lists(mut self, status: Arc<StatusListManager>) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_trust_policy(mut self, policy: Arc<dyn TrustPolicy>) -> Self {
        self.trust = Some(policy);
        self
    }

    /// Verify a credential given as JSON.
    ///
    /// The proof is checked against `document` exactly as received. The
    /// other stages read the typed form.
    pub async fn verify_document(&self, document: &Value, config: &VerificationConfig) -> VerificationResult {
        match VerifiableCredential::from_value(document.clone()) {
            Ok(credential) => self.run(&credential, document, config).await,
            Err(e) => VerificationResult::Invalid(VerificationFailure::Error {
                stage: VerificationStage::Schema,
                error: VerificationError::Document(e),
            }),
        }
    }

    /// Run every enabled stage against `credential`.
    pub async fn verify(&self, credential: &VerifiableCredential, config: &VerificationConfig) -> VerificationResult {
        match credential.to_value() {
            Ok(document) => self.run(credential, &document, config).await,
            Err(e) => VerificationResult::Invalid(VerificationFailure::Error {
                stage: VerificationStage::Proof,
                error: VerificationError::Document(e),
            }),
        }
    }

    async fn run(
        &self,
        credential: &VerifiableCredential,
        document: &Value,
        config: &VerificationConfig,
    ) -> VerificationResult {
        let mut run = Run {
            short_circuit: config.short_circuit(),
            failures: Vec::new(),
            warnings: Vec::new(),
        };
        let now = config.now.unwrap_or_else(Timestamp::now);

        if config.check_schema {
            if let Some(schema) = &config.schema {
                let format = config.schema_format.unwrap_or_else(|| SchemaFormat::detect(schema));
                let outcome = self.schemas.validate(credential, schema, format);
                if !outcome.is_valid() && run.fail(VerificationFailure::SchemaFailed(outcome.errors)) {
                    return run.finish();
                }
            }
        }

        if config.check_proof {
            let outcome = self.proofs.verify(document, self.resolver.as_ref()).await;
            if !outcome.is_valid() {
                run.fail(VerificationFailure::ProofInvalid(outcome));
                return run.finish();
            }
        } else {
            run.warnings.push("proof was not verified".to_string());
        }

        if config.check_expiration {
            if let Some(expiration_date) = credential.expiration_date {
                if credential.is_expired_at(&now)
                    && run.fail(VerificationFailure::Expired {
                        expiration_date,
                        checked_at: now,
                    })
                {
                    return run.finish();
                }
            }
            if credential.is_issued_after(&now) {
                run.warnings.push(format!("issuanceDate is after {now}"));
            }
        }

        if config.check_revocation && self.check_revocation(credential, config, &mut run) {
            return run.finish();
        }

        let issuer = credential.issuer.id();
        if config.check_trust {
            match &self.trust {
                Some(policy) => {
                    if !policy.is_trusted(issuer).await
                        && run.fail(VerificationFailure::UntrustedIssuer(issuer.to_string()))
                    {
                        return run.finish();
                    }
                }
                None => run.warnings.push("no trust policy configured; issuer not checked".to_string()),
            }
        }

        let result = run.finish();
        tracing::debug!(issuer, valid = result.is_valid(), "credential verified");
        result
    }

    /// Returns true if the run should stop.
    fn check_revocation(&self, credential: &VerifiableCredential, config: &VerificationConfig, run: &mut Run) -> bool {
        if credential.credential_status.is_empty() {
            return false;
        }
        let Some(status) = &self.status else {
            run.warnings
                .push("credential has status entries but no status lists are configured".to_string());
            return false;
        };
        match status.check_credential_as(credential, config.status_identity.as_deref()) {
            Ok(check) => {
                if check.revoked && run.fail(VerificationFailure::Revoked(check)) {
                    return true;
                }
                check.suspended && run.fail(VerificationFailure::Suspended(check))
            }
            Err(e) => run.fail(VerificationFailure::Error {
                stage: VerificationStage::Revocation,
                error: VerificationError::Status(e),
            }),
        }
    }
}
