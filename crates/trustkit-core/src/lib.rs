//! # trustkit-core — Foundational Types
//!
//! The leaf of the trustkit crate graph. Every other crate in the workspace
//! depends on `trustkit-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** All digest and signing input flows through
//!    [`CanonicalBytes`]. There is no other way to produce the bytes that get
//!    hashed or signed, so two implementations that agree on RFC 8785 agree on
//!    every digest and every signature input.
//!
//! 2. **Self-describing digests.** [`ContentDigest`] renders as a multibase
//!    string (`z` + base58btc) so a digest string carries its own encoding.
//!
//! 3. **Explicit engines, no globals.** The [`DigestEngine`] owns its LRU
//!    cache. Callers construct one at startup and inject it where needed.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `trustkit-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod cache;
pub mod canonical;
pub mod config;
pub mod digest;
pub mod engine;
pub mod error;
pub mod observability;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use cache::DigestCache;
pub use canonical::CanonicalBytes;
pub use config::{ConfigError, TrustConfig};
pub use digest::{sha256_digest, ContentDigest, DigestAlgorithm};
pub use engine::DigestEngine;
pub use error::{DigestError, TrustError};
pub use temporal::Timestamp;
