//! # Verifiable Credential structure
//!
//! [`VerifiableCredential`] follows the W3C VC Data Model. The envelope is
//! typed; `credentialSubject` is free-form JSON.
//!
//! Polymorphic members (`@context`, `type`, `issuer`, `credentialStatus`)
//! keep the shape they were parsed with, and unmodelled top-level members
//! are kept in `extra`. Scalars are normalized, though: dates are written
//! back in RFC 3339 with a `Z` offset, `statusListIndex` as a string, and
//! a `null` id is dropped. Proofs over documents received from elsewhere
//! must therefore be checked against the JSON as received, not against a
//! re-serialized struct.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use trustkit_core::{CanonicalBytes, DigestError, Timestamp};

use crate::proof::Proof;

/// The base credential type every credential carries.
pub const VERIFIABLE_CREDENTIAL: &str = "VerifiableCredential";

/// A W3C Verifiable Credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiableCredential {
    #[serde(rename = "@context")]
    pub context: ContextValue,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub credential_type: CredentialTypeValue,

    pub issuer: Issuer,

    #[serde(rename = "issuanceDate", default, skip_serializing_if = "Option::is_none")]
    pub issuance_date: Option<DateTime<Utc>>,

    #[serde(rename = "expirationDate", default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,

    #[serde(rename = "credentialSubject")]
    pub credential_subject: Value,

    /// References into status lists. Covered by the proof.
    #[serde(
        rename = "credentialStatus",
        default,
        skip_serializing_if = "CredentialStatusValue::is_empty"
    )]
    pub credential_status: CredentialStatusValue,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,

    /// Top-level members not modelled above (`credentialSchema`, `name`...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// JSON-LD `@context`: a single URI or an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Single(String),
    Array(Vec<Value>),
}

impl Default for ContextValue {
    fn default() -> Self {
        Self::Array(vec![Value::String(
            "https://www.w3.org/2018/credentials/v1".to_string(),
        )])
    }
}

/// `issuer`: a bare identifier or an object with an `id` and any other
/// members (`name`, `image`...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Issuer {
    Id(String),
    Object {
        id: String,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl Issuer {
    /// The issuer's identifier, whichever form it was given in.
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Object { id, .. } => id,
        }
    }
}

impl From<String> for Issuer {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for Issuer {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl std::fmt::Display for Issuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Credential `type`: a single string or an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CredentialTypeValue {
    Single(String),
    Array(Vec<String>),
}

impl CredentialTypeValue {
    pub fn contains(&self, ty: &str) -> bool {
        match self {
            Self::Single(s) => s == ty,
            Self::Array(arr) => arr.iter().any(|s| s == ty),
        }
    }

    pub fn as_list(&self) -> Vec<&str> {
        match self {
            Self::Single(s) => vec![s.as_str()],
            Self::Array(arr) => arr.iter().map(String::as_str).collect(),
        }
    }
}

/// Which flag a status list tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPurpose {
    Revocation,
    Suspension,
}

impl std::fmt::Display for StatusPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Revocation => write!(f, "revocation"),
            Self::Suspension => write!(f, "suspension"),
        }
    }
}

/// A `credentialStatus` entry: a back-reference to one bit in a status list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialStatus {
    pub id: String,

    #[serde(rename = "type")]
    pub status_type: String,

    #[serde(rename = "statusPurpose")]
    pub status_purpose: StatusPurpose,

    /// Serialized as a decimal string; numbers are accepted on input.
    #[serde(
        rename = "statusListIndex",
        default,
        skip_serializing_if = "Option::is_none",
        with = "index_string"
    )]
    pub status_list_index: Option<usize>,

    /// Identifier of the status list.
    #[serde(rename = "statusListCredential")]
    pub status_list_credential: String,
}

/// `credentialStatus`: a single entry or an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CredentialStatusValue {
    Single(Box<CredentialStatus>),
    Array(Vec<CredentialStatus>),
}

impl Default for CredentialStatusValue {
    fn default() -> Self {
        Self::Array(Vec::new())
    }
}

impl CredentialStatusValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(_) => false,
            Self::Array(arr) => arr.is_empty(),
        }
    }

    pub fn as_list(&self) -> Vec<&CredentialStatus> {
        match self {
            Self::Single(s) => vec![s.as_ref()],
            Self::Array(arr) => arr.iter().collect(),
        }
    }

    /// Add an entry. The first entry is stored as a single object; later
    /// ones switch to the array form.
    pub fn push(&mut self, status: CredentialStatus) {
        match self {
            Self::Array(arr) if arr.is_empty() => *self = Self::Single(Box::new(status)),
            Self::Array(arr) => arr.push(status),
            Self::Single(existing) => {
                let prev = (**existing).clone();
                *self = Self::Array(vec![prev, status]);
            }
        }
    }
}

mod index_string {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawIndex {
        Number(usize),
        Text(String),
    }

    pub fn serialize<S: Serializer>(index: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match index {
            Some(i) => serializer.serialize_str(&i.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        match Option::<RawIndex>::deserialize(deserializer)? {
            None => Ok(None),
            Some(RawIndex::Number(n)) => Ok(Some(n)),
            Some(RawIndex::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}

impl VerifiableCredential {
    /// A minimal unsigned credential with the base type and default context.
    pub fn new(issuer: impl Into<Issuer>, credential_subject: Value) -> Self {
        Self {
            context: ContextValue::default(),
            id: None,
            credential_type: CredentialTypeValue::Array(vec![VERIFIABLE_CREDENTIAL.to_string()]),
            issuer: issuer.into(),
            issuance_date: None,
            expiration_date: None,
            credential_subject,
            credential_status: CredentialStatusValue::default(),
            proof: None,
            extra: Map::new(),
        }
    }

    /// JSON form of the credential, proof included.
    pub fn to_value(&self) -> Result<Value, DigestError> {
        serde_json::to_value(self).map_err(|e| DigestError::InvalidDocument(e.to_string()))
    }

    pub fn from_value(value: Value) -> Result<Self, DigestError> {
        serde_json::from_value(value).map_err(|e| DigestError::InvalidDocument(e.to_string()))
    }

    /// Canonical bytes of the credential with `proof` removed.
    pub fn signing_input(&self) -> Result<CanonicalBytes, DigestError> {
        let mut value = self.to_value()?;
        if let Some(obj) = value.as_object_mut() {
            obj.remove("proof");
        }
        CanonicalBytes::from_value(&value)
    }

    pub fn has_type(&self, ty: &str) -> bool {
        self.credential_type.contains(ty)
    }

    /// The identity used for status-list bookkeeping: `id` if present,
    /// otherwise `fallback`.
    pub fn status_identity(&self, fallback: &str) -> String {
        self.id.clone().unwrap_or_else(|| fallback.to_string())
    }

    /// True if an expiration date exists and lies before `now`.
    pub fn is_expired_at(&self, now: &Timestamp) -> bool {
        self.expiration_date
            .map(|exp| exp < *now.as_datetime())
            .unwrap_or(false)
    }

    /// True if an issuance date exists and lies after `now`.
    pub fn is_issued_after(&self, now: &Timestamp) -> bool {
        self.issuance_date
            .map(|iss| iss > *now.as_datetime())
            .unwrap_or(false)
    }

    /// Status entries for one purpose.
    pub fn status_entries(&self, purpose: StatusPurpose) -> Vec<&CredentialStatus> {
        self.credential_status
            .as_list()
            .into_iter()
            .filter(|s| s.status_purpose == purpose)
            .collect()
    }
}
