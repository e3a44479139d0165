//! Per-call verification settings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use trustkit_core::Timestamp;
use trustkit_schema::SchemaFormat;

/// What to do after the first failing stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMode {
    /// Stop at the first failure.
    #[default]
    ShortCircuit,
    /// Run every enabled stage and report all failures. A failed proof
    /// still stops the revocation and trust stages, whose inputs come from
    /// the unauthenticated document.
    CollectAll,
}

/// Stage toggles, evaluation clock and schema for one verification.
///
/// Every stage is enabled by default. The schema stage only runs when a
/// schema is supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationConfig {
    pub check_schema: bool,
    pub check_proof: bool,
    pub check_expiration: bool,
    pub check_revocation: bool,
    pub check_trust: bool,
    pub mode: VerificationMode,
    /// Evaluation time for expiration; `None` means now.
    pub now: Option<Timestamp>,
    pub schema: Option<Value>,
    /// Format of `schema`; detected from the document when `None`.
    pub schema_format: Option<SchemaFormat>,
    /// Status-list identity for a credential that has no `id`.
    pub status_identity: Option<String>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            check_schema: true,
            check_proof: true,
            check_expiration: true,
            check_revocation: true,
            check_trust: true,
            mode: VerificationMode::ShortCircuit,
            now: None,
            schema: None,
            schema_format: None,
            status_identity: None,
        }
    }
}

impl VerificationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_schema_format(mut self, format: SchemaFormat, schema: Value) -> Self {
        self.schema_format = Some(format);
        self.schema = Some(schema);
        self
    }

    /// Look up an id-less credential's status assignments under `identity`.
    /// Ignored when the credential has an `id`.
    pub fn with_status_identity(mut self, identity: impl Into<String>) -> Self {
        self.status_identity = Some(identity.into());
        self
    }

    /// Evaluate time-dependent checks at `now` instead of the wall clock.
    pub fn at(mut self, now: Timestamp) -> Self {
        self.now = Some(now);
        self
    }

    pub fn collect_all(mut self) -> Self {
        self.mode = VerificationMode::CollectAll;
        self
    }

    pub fn skip_schema(mut self) -> Self {
        self.check_schema = false;
        self
    }

    pub fn skip_proof(mut self) -> Self {
        self.check_proof = false;
        self
    }

    pub fn skip_expiration(mut self) -> Self {
        self.check_expiration = false;
        self
    }

    pub fn skip_revocation(mut self) -> Self {
        self.check_revocation = false;
        self
    }

    pub fn skip_trust(mut self) -> Self {
        self.check_trust = false;
        self
    }

    pub(crate) fn short_circuit(&self) -> bool {
        self.mode == VerificationMode::ShortCircuit
    }
}
