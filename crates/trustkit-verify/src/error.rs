//! Errors raised while issuing, and unexpected errors met while verifying.

use thiserror::Error;

use trustkit_core::DigestError;
use trustkit_status::StatusListError;
use trustkit_vc::ProofError;

#[derive(Error, Debug)]
pub enum IssueError {
    #[error("signing failed: {0}")]
    Proof(#[from] ProofError),

    #[error("status list: {0}")]
    Status(#[from] StatusListError),

    /// Status lists were requested but the issuer has no manager.
    #[error("no status-list manager configured")]
    NoStatusManager,
}

/// A verification stage could not reach a verdict.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("status list: {0}")]
    Status(#[from] StatusListError),

    #[error("document: {0}")]
    Document(#[from] DigestError),
}
