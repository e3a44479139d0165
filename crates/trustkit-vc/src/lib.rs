//! # trustkit-vc — Credentials and Proofs
//!
//! - **Credential structure** ([`VerifiableCredential`]) following the W3C
//!   VC Data Model, including `credentialStatus` back-references into
//!   status lists.
//! - **Proof suites** ([`ProofSuite`]) that sign and verify JSON documents.
//!   Two Ed25519 suites ship here: [`Ed25519Signature2020`] and
//!   [`EddsaJcs2022`].
//! - **Proof engine** ([`ProofEngine`]) that selects suites through a
//!   [`ProviderRegistry`](trustkit_registry::ProviderRegistry) keyed by
//!   suite id.
//!
//! ## Security Invariants
//!
//! - Every signing input is derived from
//!   [`CanonicalBytes`](trustkit_core::CanonicalBytes) of the document with
//!   its `proof` member removed. Sign and verify share one code path for
//!   this, so they cannot disagree on the canonical form.
//! - Verification never mutates the document.

pub mod credential;
pub mod engine;
pub mod error;
pub mod proof;
pub mod suite;
pub mod suites;

pub use credential::{
    ContextValue, CredentialStatus, CredentialStatusValue, CredentialTypeValue, Issuer,
    StatusPurpose, VerifiableCredential,
};
pub use engine::ProofEngine;
pub use error::{ProofError, VerificationOutcome};
pub use proof::{Proof, ProofPurpose};
pub use suite::{ProofSuite, SigningContext};
pub use suites::{EddsaJcs2022, Ed25519Signature2020};
