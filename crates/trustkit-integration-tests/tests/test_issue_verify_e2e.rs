//! # Issue then verify
//!
//! The full relying-party path: an issuer signs a credential with a status
//! entry, and a verifier configured with schema, status lists and a trust
//! policy accepts or rejects it.

use std::sync::Arc;

use serde_json::json;
use trustkit_core::Timestamp;
use trustkit_crypto::{InMemoryKeyStore, KeyAlgorithm, StaticResolver};
use trustkit_schema::{SchemaFormat, SchemaValidatorRegistry, ValidationCode};
use trustkit_status::StatusListManager;
use trustkit_vc::{EddsaJcs2022, ProofEngine, SigningContext, StatusPurpose, VerifiableCredential};
use trustkit_verify::{
    CredentialIssuer, CredentialVerifier, StaticTrustPolicy, VerificationConfig, VerificationFailure,
    VerificationStage,
};

const ISSUER: &str = "did:example:university";
const VM: &str = "did:example:university#key-1";

struct World {
    issuer: CredentialIssuer,
    verifier: CredentialVerifier,
    status: Arc<StatusListManager>,
    trust: Arc<StaticTrustPolicy>,
    ctx: SigningContext,
}

fn world() -> World {
    let keys = Arc::new(InMemoryKeyStore::new());
    let key_id = keys.generate(KeyAlgorithm::Ed25519).unwrap();
    let resolver = StaticResolver::new().with(VM, keys.public_material(&key_id).unwrap());
    let proofs = Arc::new(ProofEngine::new());
    proofs.register_default(Arc::new(EddsaJcs2022::new(keys))).unwrap();

    let status = Arc::new(StatusListManager::with_default_capacity(64));
    status
        .create_list(ISSUER, StatusPurpose::Revocation, 64, Some("revocations".into()))
        .unwrap();
    let trust = Arc::new(StaticTrustPolicy::new([ISSUER]));

    World {
        issuer: CredentialIssuer::new(proofs.clone()).with_status_lists(status.clone()),
        verifier: CredentialVerifier::new(proofs, Arc::new(resolver))
            .with_schema_validators(SchemaValidatorRegistry::with_defaults())
            .with_status_lists(status.clone())
            .with_trust_policy(trust.clone()),
        status,
        trust,
        ctx: SigningContext::new(key_id, VM),
    }
}

fn diploma() -> VerifiableCredential {
    let mut vc = VerifiableCredential::new(ISSUER, json!({"id": "did:example:alice", "degree": "BSc"}));
    vc.credential_type = serde_json::from_value(json!(["VerifiableCredential", "Diploma"])).unwrap();
    vc
}

fn diploma_schema() -> serde_json::Value {
    json!({
        "credentialType": "Diploma",
        "type": "object",
        "required": ["id", "degree"],
        "properties": {"degree": {"type": "string", "enum": ["BSc", "MSc", "PhD"]}}
    })
}

async fn issue(w: &World) -> VerifiableCredential {
    w.issuer
        .issue(&diploma(), EddsaJcs2022::ID, &w.ctx, &["revocations"])
        .await
        .unwrap()
}

#[tokio::test]
async fn freshly_issued_credential_is_accepted() {
    let w = world();
    let vc = issue(&w).await;
    let config = VerificationConfig::new().with_schema(diploma_schema());
    let result = w.verifier.verify(&vc, &config).await;
    assert!(result.is_valid(), "{result:?}");
    assert!(result.warnings().is_empty());
}

#[tokio::test]
async fn serialized_credential_verifies_as_a_document() {
    let w = world();
    let vc = issue(&w).await;
    let text = serde_json::to_string(&vc).unwrap();
    let document: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(w.verifier.verify_document(&document, &VerificationConfig::new()).await.is_valid());
}

#[tokio::test]
async fn revocation_is_seen_by_the_verifier() {
    let w = world();
    let vc = issue(&w).await;
    let id = vc.id.clone().unwrap();
    assert!(w.status.revoke(&id, "revocations"));

    let result = w.verifier.verify(&vc, &VerificationConfig::new()).await;
    assert!(matches!(result.failure(), Some(VerificationFailure::Revoked(_))));

    w.status.unrevoke(&id, "revocations");
    assert!(w.verifier.verify(&vc, &VerificationConfig::new()).await.is_valid());
}

#[tokio::test]
async fn distrusted_issuer_is_rejected() {
    let w = world();
    let vc = issue(&w).await;
    assert!(w.trust.distrust(ISSUER));
    let result = w.verifier.verify(&vc, &VerificationConfig::new()).await;
    assert_eq!(
        result.failure().and_then(VerificationFailure::stage),
        Some(VerificationStage::Trust)
    );
}

#[tokio::test]
async fn collect_all_reports_every_failing_stage() {
    let w = world();
    let mut unsigned = diploma();
    unsigned.expiration_date = Some(*Timestamp::parse("2020-01-01T00:00:00Z").unwrap().as_datetime());
    let vc = w
        .issuer
        .issue(&unsigned, EddsaJcs2022::ID, &w.ctx, &["revocations"])
        .await
        .unwrap();
    w.status.revoke(vc.id.as_deref().unwrap(), "revocations");

    let bad_schema = json!({"type": "object", "required": ["gpa"]});
    let config = VerificationConfig::new().with_schema(bad_schema).collect_all();
    let result = w.verifier.verify(&vc, &config).await;
    let stages: Vec<_> = result.failures().iter().filter_map(|f| f.stage()).collect();
    assert_eq!(
        stages,
        vec![VerificationStage::Schema, VerificationStage::Expiration, VerificationStage::Revocation]
    );

    let Some(VerificationFailure::SchemaFailed(errors)) = result.failures().first().copied() else {
        panic!("expected a schema failure first");
    };
    assert_eq!(errors[0].code, ValidationCode::RequiredFieldMissing);
    assert_eq!(errors[0].path, "/credentialSubject/gpa");
}

#[tokio::test]
async fn shape_schemas_plug_into_the_same_stage() {
    let w = world();
    let vc = issue(&w).await;
    let shape = json!({
        "targetClass": "Diploma",
        "property": [{"path": "degree", "datatype": "string", "minCount": 1, "in": ["MSc"]}]
    });
    let config = VerificationConfig::new().with_schema_format(SchemaFormat::Shape, shape);
    let result = w.verifier.verify(&vc, &config).await;
    let Some(VerificationFailure::SchemaFailed(errors)) = result.failure() else {
        panic!("expected a schema failure, got {result:?}");
    };
    assert_eq!(errors[0].code, ValidationCode::EnumMismatch);
}
