//! # Provider Registry
//!
//! Owns provider metadata plus one backend instance per id, with two
//! secondary indices: capability to ids and provider name to ids.
//!
//! All three maps live behind a single `RwLock` so every `register` and
//! `unregister` updates them together; readers never observe an id in one
//! index but not another. The lock is per registry, not global.
//!
//! Lookups return providers in registration order.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::RegistryError;
use crate::metadata::ProviderMetadata;

/// A registered backend and its metadata.
pub struct RegisteredProvider<T: ?Sized> {
    pub metadata: ProviderMetadata,
    pub instance: Arc<T>,
}

impl<T: ?Sized> Clone for RegisteredProvider<T> {
    fn clone(&self) -> Self {
        Self {
            metadata: self.metadata.clone(),
            instance: Arc::clone(&self.instance),
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for RegisteredProvider<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredProvider")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

struct Entry<T: ?Sized> {
    seq: u64,
    provider: RegisteredProvider<T>,
}

struct Inner<T: ?Sized> {
    next_seq: u64,
    entries: HashMap<String, Entry<T>>,
    by_capability: HashMap<String, HashSet<String>>,
    by_provider: HashMap<String, HashSet<String>>,
}

impl<T: ?Sized> Inner<T> {
    fn collect(&self, ids: Option<&HashSet<String>>) -> Vec<RegisteredProvider<T>> {
        let Some(ids) = ids else {
            return Vec::new();
        };
        let mut found: Vec<&Entry<T>> = ids.iter().filter_map(|id| self.entries.get(id)).collect();
        found.sort_by_key(|e| e.seq);
        found.into_iter().map(|e| e.provider.clone()).collect()
    }
}

fn unindex(index: &mut HashMap<String, HashSet<String>>, key: &str, id: &str) {
    if let Some(ids) = index.get_mut(key) {
        ids.remove(id);
        if ids.is_empty() {
            index.remove(key);
        }
    }
}

/// Capability-indexed registry of backend instances.
pub struct ProviderRegistry<T: ?Sized> {
    inner: RwLock<Inner<T>>,
}

impl<T: ?Sized> Default for ProviderRegistry<T> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_seq: 0,
                entries: HashMap::new(),
                by_capability: HashMap::new(),
                by_provider: HashMap::new(),
            }),
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for ProviderRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

impl<T: ?Sized> ProviderRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend under `metadata.id`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::BlankId`] if the id is empty or whitespace.
    /// - [`RegistryError::AlreadyRegistered`] if the id is taken. The
    ///   existing registration is left in place.
    pub fn register(&self, metadata: ProviderMetadata, instance: Arc<T>) -> Result<(), RegistryError> {
        if metadata.id.trim().is_empty() {
            return Err(RegistryError::BlankId);
        }
        let mut inner = self.inner.write();
        if let Some(existing) = inner.entries.get(&metadata.id) {
            return Err(RegistryError::AlreadyRegistered {
                id: metadata.id.clone(),
                existing_name: existing.provider.metadata.name.clone(),
            });
        }
        let id = metadata.id.clone();
        for capability in &metadata.capabilities {
            inner
                .by_capability
                .entry(capability.clone())
                .or_default()
                .insert(id.clone());
        }
        inner
            .by_provider
            .entry(metadata.provider.clone())
            .or_default()
            .insert(id.clone());
        let seq = inner.next_seq;
        inner.next_seq += 1;
        tracing::debug!(provider_id = %id, capabilities = ?metadata.capabilities, "provider registered");
        inner.entries.insert(
            id,
            Entry {
                seq,
                provider: RegisteredProvider { metadata, instance },
            },
        );
        Ok(())
    }

    /// Remove a provider from all indices. Returns the removed entry, or
    /// `None` if the id was not registered.
    pub fn unregister(&self, id: &str) -> Option<RegisteredProvider<T>> {
        let mut inner = self.inner.write();
        let entry = inner.entries.remove(id)?;
        for capability in &entry.provider.metadata.capabilities {
            unindex(&mut inner.by_capability, capability, id);
        }
        unindex(&mut inner.by_provider, &entry.provider.metadata.provider, id);
        tracing::debug!(provider_id = %id, "provider unregistered");
        Some(entry.provider)
    }

    pub fn get(&self, id: &str) -> Option<Arc<T>> {
        self.inner
            .read()
            .entries
            .get(id)
            .map(|e| Arc::clone(&e.provider.instance))
    }

    pub fn metadata(&self, id: &str) -> Option<ProviderMetadata> {
        self.inner
            .read()
            .entries
            .get(id)
            .map(|e| e.provider.metadata.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.read().entries.contains_key(id)
    }

    /// Providers advertising `capability`, in registration order.
    pub fn find_by_capability(&self, capability: &str) -> Vec<RegisteredProvider<T>> {
        let inner = self.inner.read();
        inner.collect(inner.by_capability.get(capability))
    }

    /// Providers from the named vendor/backend family, in registration order.
    pub fn find_by_provider(&self, provider: &str) -> Vec<RegisteredProvider<T>> {
        let inner = self.inner.read();
        inner.collect(inner.by_provider.get(provider))
    }

    /// Pick a provider for `capability`, honouring `preferences` in order.
    ///
    /// A preference matches a candidate by id or by provider name. When no
    /// preference matches, the first registered candidate is returned
    /// anyway; `None` means nothing offers the capability at all.
    pub fn select_provider(
        &self,
        capability: &str,
        preferences: &[&str],
    ) -> Option<RegisteredProvider<T>> {
        let candidates = self.find_by_capability(capability);
        for preference in preferences {
            if let Some(hit) = candidates
                .iter()
                .find(|c| c.metadata.id == *preference || c.metadata.provider == *preference)
            {
                return Some(hit.clone());
            }
        }
        let fallback = candidates.into_iter().next();
        if let Some(chosen) = &fallback {
            if !preferences.is_empty() {
                tracing::debug!(
                    capability,
                    chosen = %chosen.metadata.id,
                    "no preferred provider matched; using first available"
                );
            }
        }
        fallback
    }

    /// All registered ids, in registration order.
    pub fn ids(&self) -> Vec<String> {
        let inner = self.inner.read();
        let mut entries: Vec<(&String, u64)> =
            inner.entries.iter().map(|(id, e)| (id, e.seq)).collect();
        entries.sort_by_key(|(_, seq)| *seq);
        entries.into_iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registration and index.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.entries.clear();
        inner.by_capability.clear();
        inner.by_provider.clear();
    }

    #[cfg(test)]
    fn index_sizes(&self) -> (usize, usize, usize) {
        let inner = self.inner.read();
        (
            inner.entries.len(),
            inner.by_capability.values().map(HashSet::len).sum(),
            inner.by_provider.values().map(HashSet::len).sum(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Backend: Send + Sync {
        fn label(&self) -> String;
    }

    struct Named(&'static str);

    impl Backend for Named {
        fn label(&self) -> String {
            self.0.to_string()
        }
    }

    fn meta(id: &str, provider: &str, caps: &[&str]) -> ProviderMetadata {
        caps.iter().fold(
            ProviderMetadata::new(id, format!("{id} backend"), provider),
            |m, c| m.with_capability(*c),
        )
    }

    fn registry() -> ProviderRegistry<dyn Backend> {
        let reg: ProviderRegistry<dyn Backend> = ProviderRegistry::new();
        reg.register(meta("soft-1", "software", &["sign", "verify"]), Arc::new(Named("soft-1")))
            .unwrap();
        reg.register(meta("kms-1", "aws-kms", &["sign"]), Arc::new(Named("kms-1")))
            .unwrap();
        reg.register(meta("soft-2", "software", &["verify"]), Arc::new(Named("soft-2")))
            .unwrap();
        reg
    }

    fn ids(found: &[RegisteredProvider<dyn Backend>]) -> Vec<&str> {
        found.iter().map(|p| p.metadata.id.as_str()).collect()
    }

    #[test]
    fn finds_by_capability_in_registration_order() {
        let reg = registry();
        assert_eq!(ids(&reg.find_by_capability("sign")), vec!["soft-1", "kms-1"]);
        assert_eq!(ids(&reg.find_by_capability("verify")), vec!["soft-1", "soft-2"]);
        assert!(reg.find_by_capability("encrypt").is_empty());
    }

    #[test]
    fn finds_by_provider() {
        let reg = registry();
        assert_eq!(ids(&reg.find_by_provider("software")), vec!["soft-1", "soft-2"]);
        assert_eq!(ids(&reg.find_by_provider("aws-kms")), vec!["kms-1"]);
    }

    #[test]
    fn blank_id_rejected() {
        let reg: ProviderRegistry<dyn Backend> = ProviderRegistry::new();
        let err = reg
            .register(meta("  ", "software", &["sign"]), Arc::new(Named("x")))
            .unwrap_err();
        assert_eq!(err, RegistryError::BlankId);
        assert!(reg.is_empty());
    }

    #[test]
    fn duplicate_register_fails_without_mutation() {
        let reg = registry();
        let before = reg.index_sizes();
        let err = reg
            .register(meta("kms-1", "other", &["encrypt"]), Arc::new(Named("dup")))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::AlreadyRegistered {
                id: "kms-1".to_string(),
                existing_name: "kms-1 backend".to_string(),
            }
        );
        assert_eq!(reg.index_sizes(), before);
        assert_eq!(reg.get("kms-1").unwrap().label(), "kms-1");
        assert!(reg.find_by_capability("encrypt").is_empty());
    }

    #[test]
    fn unregister_clears_every_index() {
        let reg = registry();
        assert!(reg.unregister("soft-1").is_some());
        assert!(reg.get("soft-1").is_none());
        assert_eq!(ids(&reg.find_by_capability("sign")), vec!["kms-1"]);
        assert_eq!(ids(&reg.find_by_provider("software")), vec!["soft-2"]);
        assert_eq!(reg.index_sizes(), (2, 2, 2));
    }

    #[test]
    fn unregister_is_idempotent() {
        let reg = registry();
        assert!(reg.unregister("nope").is_none());
        reg.unregister("kms-1");
        assert!(reg.unregister("kms-1").is_none());
        assert!(reg.find_by_provider("aws-kms").is_empty());
    }

    #[test]
    fn select_provider_honours_preference_order() {
        let reg = registry();
        let chosen = reg.select_provider("sign", &["aws-kms", "soft-1"]).unwrap();
        assert_eq!(chosen.metadata.id, "kms-1");
        let chosen = reg.select_provider("sign", &["soft-1"]).unwrap();
        assert_eq!(chosen.metadata.id, "soft-1");
    }

    #[test]
    fn select_provider_falls_back_to_first_match() {
        let reg = registry();
        let chosen = reg.select_provider("verify", &["hsm"]).unwrap();
        assert_eq!(chosen.metadata.id, "soft-1");
        assert!(reg.select_provider("encrypt", &["soft-1"]).is_none());
    }

    #[test]
    fn clear_empties_registry() {
        let reg = registry();
        reg.clear();
        assert_eq!(reg.index_sizes(), (0, 0, 0));
        assert!(reg.ids().is_empty());
    }

    #[test]
    fn ids_in_registration_order() {
        assert_eq!(registry().ids(), vec!["soft-1", "kms-1", "soft-2"]);
    }
}
