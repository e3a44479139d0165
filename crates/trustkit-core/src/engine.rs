//! # Canonical Digest Engine
//!
//! Canonicalizes documents and computes content digests, memoizing results
//! in a [`DigestCache`] keyed by the exact bytes that were hashed.
//!
//! ## Text auto-detection
//!
//! [`DigestEngine::digest_text()`] treats its input as opaque bytes unless it
//! parses as a JSON object or array, in which case it is canonicalized first.
//! So `digest_text("{\"b\":1, \"a\":2}")` equals `digest(&json!({"a":2,"b":1}))`,
//! while `digest_text("hello")` hashes the five bytes `hello`. Scalars that
//! happen to parse as JSON (`"42"`, `"true"`) are hashed as opaque text;
//! their canonical form is the same byte sequence anyway.

use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;

use crate::cache::DigestCache;
use crate::canonical::CanonicalBytes;
use crate::config::TrustConfig;
use crate::digest::{sha256_raw, ContentDigest, DigestAlgorithm};
use crate::error::DigestError;

/// Canonicalization plus cached SHA-256 digesting.
///
/// Constructed explicitly and shared by reference (or `Arc`); there is no
/// process-wide instance.
#[derive(Debug)]
pub struct DigestEngine {
    cache: DigestCache,
    enabled: AtomicBool,
}

impl Default for DigestEngine {
    fn default() -> Self {
        Self::new(TrustConfig::default().digest_cache_size)
    }
}

impl DigestEngine {
    /// Create an engine whose cache holds at most `max_size` digests.
    /// A `max_size` of 0 disables caching.
    pub fn new(max_size: usize) -> Self {
        Self {
            cache: DigestCache::new(max_size),
            enabled: AtomicBool::new(max_size > 0),
        }
    }

    /// Create an engine sized from configuration.
    pub fn from_config(config: &TrustConfig) -> Self {
        Self::new(config.digest_cache_size)
    }

    /// Canonicalize a structured document.
    pub fn canonicalize(&self, doc: &Value) -> Result<CanonicalBytes, DigestError> {
        CanonicalBytes::from_value(doc)
    }

    /// Canonicalize a document and return its multibase digest string.
    pub fn digest(&self, doc: &Value) -> Result<String, DigestError> {
        let canonical = self.canonicalize(doc)?;
        Ok(self.digest_bytes(canonical.as_str()))
    }

    /// Canonicalize a document and return its typed digest (uncached).
    pub fn content_digest(&self, doc: &Value) -> Result<ContentDigest, DigestError> {
        let canonical = self.canonicalize(doc)?;
        Ok(crate::digest::sha256_digest(&canonical))
    }

    /// Digest text, canonicalizing it first if it is a JSON object or array.
    pub fn digest_text(&self, text: &str) -> Result<String, DigestError> {
        match serde_json::from_str::<Value>(text) {
            Ok(value) if value.is_object() || value.is_array() => self.digest(&value),
            _ => Ok(self.digest_bytes(text)),
        }
    }

    fn digest_bytes(&self, key: &str) -> String {
        let caching = self.is_cache_enabled();
        if caching {
            if let Some(hit) = self.cache.get(key) {
                return hit;
            }
        }
        let digest = ContentDigest::new(DigestAlgorithm::Sha256, sha256_raw(key.as_bytes()))
            .to_multibase();
        if caching {
            self.cache.insert(key.to_string(), digest.clone());
        }
        digest
    }

    /// Enable or disable caching. Disabling clears the cache immediately.
    pub fn set_cache_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        if !enabled {
            self.cache.clear();
        }
        tracing::debug!(enabled, "digest cache toggled");
    }

    /// Returns true if digests are being cached.
    pub fn is_cache_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst) && self.cache.max_size() > 0
    }

    /// Resize the cache; shrinking evicts the oldest entries synchronously.
    ///
    /// The size is also the on/off switch: a non-zero size enables caching,
    /// even after [`set_cache_enabled(false)`](Self::set_cache_enabled),
    /// and 0 disables it.
    pub fn set_max_size(&self, max_size: usize) {
        self.cache.set_max_size(max_size);
        self.enabled.store(max_size > 0, Ordering::SeqCst);
        tracing::debug!(max_size, retained = self.cache.len(), "digest cache resized");
    }

    /// Current cache capacity.
    pub fn max_size(&self) -> usize {
        self.cache.max_size()
    }

    /// Number of cached digests.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached digest.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
