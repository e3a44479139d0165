//! # Proof objects
//!
//! The `proof` member attached to a signed document.
//!
//! The suite a proof belongs to is named either by its `type` directly
//! (`Ed25519Signature2020`) or, for Data Integrity proofs, by `type:
//! "DataIntegrityProof"` plus a `cryptosuite` member (`eddsa-jcs-2022`).
//! [`Proof::suite_id()`] folds both forms into one identifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `type` used by Data Integrity proofs, which name their suite in
/// `cryptosuite`.
pub const DATA_INTEGRITY_PROOF: &str = "DataIntegrityProof";

/// The purpose of a cryptographic proof.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProofPurpose {
    /// The issuer asserts the credential claims are true.
    #[default]
    AssertionMethod,
    Authentication,
}

impl std::fmt::Display for ProofPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProofPurpose::AssertionMethod => write!(f, "assertionMethod"),
            ProofPurpose::Authentication => write!(f, "authentication"),
        }
    }
}

/// A cryptographic proof on a document.
///
/// Members other than the ones modelled here (such as a proof-level
/// `@context`) are kept in `extra` so a proof survives a parse/serialize
/// cycle unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    #[serde(rename = "type")]
    pub proof_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cryptosuite: Option<String>,

    pub created: DateTime<Utc>,

    /// DID URL identifying the signing key.
    #[serde(rename = "verificationMethod")]
    pub verification_method: String,

    #[serde(rename = "proofPurpose")]
    pub proof_purpose: ProofPurpose,

    /// Multibase base58btc signature.
    #[serde(rename = "proofValue")]
    pub proof_value: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Proof {
    /// The suite identifier this proof should be verified with.
    pub fn suite_id(&self) -> &str {
        match (&self.cryptosuite, self.proof_type.as_str()) {
            (Some(suite), DATA_INTEGRITY_PROOF) => suite,
            _ => &self.proof_type,
        }
    }

    /// Read the proof member out of a document.
    pub fn from_document(document: &Value) -> Result<Option<Self>, serde_json::Error> {
        match document.get("proof") {
            None | Some(Value::Null) => Ok(None),
            Some(raw) => serde_json::from_value(raw.clone()).map(Some),
        }
    }
}
