//! Verification verdicts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use trustkit_core::Timestamp;
use trustkit_schema::ValidationError;
use trustkit_status::StatusCheck;
use trustkit_vc::VerificationOutcome;

use crate::error::VerificationError;

/// The verification stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStage {
    Schema,
    Proof,
    Expiration,
    Revocation,
    Trust,
}

impl std::fmt::Display for VerificationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Schema => "schema",
            Self::Proof => "proof",
            Self::Expiration => "expiration",
            Self::Revocation => "revocation",
            Self::Trust => "trust",
        };
        f.write_str(name)
    }
}

/// Why a credential was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    #[error("schema validation failed with {} error(s)", .0.len())]
    SchemaFailed(Vec<ValidationError>),

    #[error("proof rejected: {0}")]
    ProofInvalid(VerificationOutcome),

    #[error("credential expired at {expiration_date} (checked at {checked_at})")]
    Expired {
        expiration_date: DateTime<Utc>,
        checked_at: Timestamp,
    },

    #[error("credential is revoked")]
    Revoked(StatusCheck),

    #[error("credential is suspended")]
    Suspended(StatusCheck),

    #[error("issuer {0} is not trusted")]
    UntrustedIssuer(String),

    /// A stage could not reach a verdict.
    #[error("{stage} check failed: {error}")]
    Error {
        stage: VerificationStage,
        error: VerificationError,
    },

    #[error("{} checks failed", .0.len())]
    MultipleFailures(Vec<VerificationFailure>),
}

impl VerificationFailure {
    /// The stage that produced this failure; `None` for
    /// [`MultipleFailures`](Self::MultipleFailures).
    pub fn stage(&self) -> Option<VerificationStage> {
        match self {
            Self::SchemaFailed(_) => Some(VerificationStage::Schema),
            Self::ProofInvalid(_) => Some(VerificationStage::Proof),
            Self::Expired { .. } => Some(VerificationStage::Expiration),
            Self::Revoked(_) | Self::Suspended(_) => Some(VerificationStage::Revocation),
            Self::UntrustedIssuer(_) => Some(VerificationStage::Trust),
            Self::Error { stage, .. } => Some(*stage),
            Self::MultipleFailures(_) => None,
        }
    }
}

/// Terminal verdict of a verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    /// Every enabled stage passed. `warnings` lists checks that could not
    /// run (no trust policy, no status lists...) or did not apply.
    Valid { warnings: Vec<String> },
    Invalid(VerificationFailure),
}

impl VerificationResult {
    pub(crate) fn from_parts(mut failures: Vec<VerificationFailure>, warnings: Vec<String>) -> Self {
        match failures.len() {
            0 => Self::Valid { warnings },
            1 => Self::Invalid(failures.remove(0)),
            _ => Self::Invalid(VerificationFailure::MultipleFailures(failures)),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            Self::Valid { warnings } => warnings,
            Self::Invalid(_) => &[],
        }
    }

    pub fn failure(&self) -> Option<&VerificationFailure> {
        match self {
            Self::Valid { .. } => None,
            Self::Invalid(failure) => Some(failure),
        }
    }

    /// Individual failures, with `MultipleFailures` flattened.
    pub fn failures(&self) -> Vec<&VerificationFailure> {
        match self.failure() {
            None => Vec::new(),
            Some(VerificationFailure::MultipleFailures(all)) => all.iter().collect(),
            Some(single) => vec![single],
        }
    }
}
