//! Proof errors and verification outcomes.
//!
//! Signing failures are errors ([`ProofError`]). Verification never fails
//! with an error: every result, including a broken proof, is a
//! [`VerificationOutcome`] variant.

use thiserror::Error;
use trustkit_core::DigestError;
use trustkit_crypto::{KeyAlgorithm, SignerError};

/// Errors raised while producing a proof.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    /// No registered suite answers to this id.
    #[error("unsupported proof suite: {0}")]
    UnsupportedSuite(String),

    /// The signing key's algorithm is not usable by the suite.
    #[error("suite {suite} cannot sign with {algorithm} keys")]
    UnsupportedAlgorithm {
        suite: String,
        algorithm: KeyAlgorithm,
    },

    /// The suite instance was built for verification only.
    #[error("suite {0} has no signer configured")]
    SignerUnavailable(String),

    /// The signing collaborator failed.
    #[error("signer error: {0}")]
    Signer(#[from] SignerError),

    /// The document is not a JSON object or could not be canonicalized.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("digest error: {0}")]
    Digest(#[from] DigestError),

    /// Every provider registered for the suite failed.
    #[error("all {} providers failed; last error: {last_error}", .attempted.len())]
    AllProvidersFailed {
        attempted: Vec<String>,
        last_error: Box<ProofError>,
    },
}

/// The closed set of verification results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Valid,
    /// The signature does not match the re-derived signing input.
    InvalidSignature(String),
    /// The proof's verification method could not be resolved to usable key
    /// material.
    UnresolvableVerificationMethod(String),
    /// No suite is registered for the proof's type.
    UnsupportedSuite(String),
    /// The proof is missing, structurally invalid, or carries an
    /// undecodable value.
    MalformedProof(String),
}

impl VerificationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Stable machine-readable code for the outcome.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::InvalidSignature(_) => "invalid_signature",
            Self::UnresolvableVerificationMethod(_) => "unresolvable_verification_method",
            Self::UnsupportedSuite(_) => "unsupported_suite",
            Self::MalformedProof(_) => "malformed_proof",
        }
    }
}

impl std::fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::InvalidSignature(d)
            | Self::UnresolvableVerificationMethod(d)
            | Self::UnsupportedSuite(d)
            | Self::MalformedProof(d) => write!(f, "{}: {d}", self.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_codes_are_stable() {
        assert_eq!(VerificationOutcome::Valid.code(), "valid");
        let o = VerificationOutcome::MalformedProof("no proof".to_string());
        assert_eq!(o.to_string(), "malformed_proof: no proof");
        assert!(!o.is_valid());
    }

    #[test]
    fn all_providers_failed_display() {
        let err = ProofError::AllProvidersFailed {
            attempted: vec!["a".into(), "b".into()],
            last_error: Box::new(ProofError::Signer(SignerError::Backend("down".into()))),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("all 2 providers failed"));
        assert!(msg.contains("down"));
    }
}
