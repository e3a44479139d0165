//! # Error Hierarchy
//!
//! Structured error types for the foundational layer, built with `thiserror`.
//! Each component crate defines its own closed error enum; [`TrustError`] is
//! the umbrella for the errors that originate here.

use thiserror::Error;

use crate::config::ConfigError;

/// Top-level error type for `trustkit-core`.
#[derive(Error, Debug)]
pub enum TrustError {
    /// Canonicalization or digest computation failed.
    #[error("digest error: {0}")]
    Digest(#[from] DigestError),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A timestamp was not valid RFC 3339 UTC.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Errors from the canonical digest engine.
///
/// The taxonomy is closed: malformed input is the caller's problem,
/// encoding failure is ours and should not occur for well-formed input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    /// The input is not a valid structured document.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// Canonical serialization or digest encoding failed.
    #[error("encoding failed: {0}")]
    EncodingFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_error_display() {
        let err = DigestError::InvalidDocument("trailing comma".to_string());
        assert_eq!(err.to_string(), "invalid document: trailing comma");
    }

    #[test]
    fn trust_error_from_digest_error() {
        let err: TrustError = DigestError::EncodingFailed("boom".to_string()).into();
        assert!(matches!(err, TrustError::Digest(DigestError::EncodingFailed(_))));
        assert!(err.to_string().contains("boom"));
    }
}
