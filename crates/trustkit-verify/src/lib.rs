//! # trustkit-verify — Issuance and Verification
//!
//! [`CredentialIssuer`] embeds status-list references and signs.
//! [`CredentialVerifier`] runs the verification stages in a fixed order:
//!
//! ```text
//! schema -> proof -> expiration -> revocation -> trust
//! ```
//!
//! Each stage can be switched off per call through [`VerificationConfig`].
//! The verdict is a [`VerificationResult`]; a failing stage's structured
//! error is carried in the matching [`VerificationFailure`] variant.

pub mod config;
pub mod error;
pub mod issuer;
pub mod policy;
pub mod result;
pub mod verifier;

pub use config::{VerificationConfig, VerificationMode};
pub use error::{IssueError, VerificationError};
pub use issuer::CredentialIssuer;
pub use policy::{StaticTrustPolicy, TrustPolicy};
pub use result::{VerificationFailure, VerificationResult, VerificationStage};
pub use verifier::CredentialVerifier;
