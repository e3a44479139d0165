//! Issuer trust decisions.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::RwLock;

/// Decides whether an issuer is trusted. Implementations may consult a
/// remote registry.
#[async_trait]
pub trait TrustPolicy: Send + Sync {
    async fn is_trusted(&self, issuer: &str) -> bool;
}

/// Allow-list of issuer identifiers.
#[derive(Debug, Default)]
pub struct StaticTrustPolicy {
    trusted: RwLock<HashSet<String>>,
}

impl StaticTrustPolicy {
    pub fn new<I, S>(issuers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            trusted: RwLock::new(issuers.into_iter().map(Into::into).collect()),
        }
    }

    pub fn trust(&self, issuer: impl Into<String>) {
        self.trusted.write().insert(issuer.into());
    }

    /// Returns true if the issuer was trusted before.
    pub fn distrust(&self, issuer: &str) -> bool {
        self.trusted.write().remove(issuer)
    }

    pub fn len(&self) -> usize {
        self.trusted.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trusted.read().is_empty()
    }
}

#[async_trait]
impl TrustPolicy for StaticTrustPolicy {
    async fn is_trusted(&self, issuer: &str) -> bool {
        self.trusted.read().contains(issuer)
    }
}
