//! # trustkit-registry — Providers and Fallback
//!
//! A [`ProviderRegistry`] holds named backend instances (proof suites,
//! signers, schema validators) indexed by capability and by provider name.
//! A [`FallbackChain`] runs an operation against an ordered list of
//! interchangeable providers until one succeeds.
//!
//! Both are generic over the backend type, usually a trait object such as
//! `dyn ProofSuite`. Neither performs I/O of its own.

pub mod chain;
pub mod error;
pub mod metadata;
pub mod registry;

pub use chain::{FallbackChain, NamedProvider};
pub use error::{AllProvidersFailed, ChainBuildError, RegistryError};
pub use metadata::ProviderMetadata;
pub use registry::{ProviderRegistry, RegisteredProvider};
