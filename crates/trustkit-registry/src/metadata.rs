//! Provider metadata.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Descriptive data a backend registers under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// Unique registry key.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    pub version: String,
    /// Vendor or backend family, e.g. `software` or `aws-kms`. Indexed.
    pub provider: String,
    /// Capability tags this backend serves. Indexed.
    pub capabilities: BTreeSet<String>,
    /// Ids of other providers this one relies on. Informational only.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl ProviderMetadata {
    pub fn new(id: impl Into<String>, name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: "0.0.0".to_string(),
            provider: provider.into(),
            capabilities: BTreeSet::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    pub fn with_dependency(mut self, id: impl Into<String>) -> Self {
        self.dependencies.push(id.into());
        self
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}
