//! # Digest Cache
//!
//! A bounded least-recently-used map from canonical byte strings to their
//! digest strings. Both inserts and hits refresh recency. A `max_size` of 0
//! disables caching entirely.
//!
//! The cache owns its own lock; it never shares one with the registry or the
//! status-list manager.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

/// Thread-safe LRU cache of computed digests.
#[derive(Debug)]
pub struct DigestCache {
    inner: Mutex<CacheInner>,
}

#[derive(Debug)]
struct CacheInner {
    max_size: usize,
    /// Monotonic recency counter; larger means more recently used.
    tick: u64,
    entries: HashMap<String, CacheEntry>,
    /// Recency order: tick -> key. The first entry is the eviction victim.
    recency: BTreeMap<u64, String>,
}

#[derive(Debug)]
struct CacheEntry {
    digest: String,
    tick: u64,
}

impl CacheInner {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn touch(&mut self, key: &str) -> Option<String> {
        let tick = self.next_tick();
        let entry = self.entries.get_mut(key)?;
        self.recency.remove(&entry.tick);
        entry.tick = tick;
        self.recency.insert(tick, key.to_string());
        Some(entry.digest.clone())
    }

    fn evict_to(&mut self, limit: usize) {
        while self.entries.len() > limit {
            match self.recency.pop_first() {
                Some((_, key)) => {
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

impl DigestCache {
    /// Create a cache holding at most `max_size` entries.
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                max_size,
                tick: 0,
                entries: HashMap::new(),
                recency: BTreeMap::new(),
            }),
        }
    }

    /// Look up a digest, marking the entry as most recently used.
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().touch(key)
    }

    /// Insert or refresh an entry, evicting the oldest entries past capacity.
    pub fn insert(&self, key: String, digest: String) {
        let mut inner = self.inner.lock();
        if inner.max_size == 0 {
            return;
        }
        let tick = inner.next_tick();
        if let Some(old) = inner.entries.insert(key.clone(), CacheEntry { digest, tick }) {
            inner.recency.remove(&old.tick);
        }
        inner.recency.insert(tick, key);
        let limit = inner.max_size;
        inner.evict_to(limit);
    }

    /// Change the capacity. Shrinking evicts the oldest entries immediately.
    pub fn set_max_size(&self, max_size: usize) {
        let mut inner = self.inner.lock();
        inner.max_size = max_size;
        inner.evict_to(max_size);
    }

    /// Current capacity.
    pub fn max_size(&self) -> usize {
        self.inner.lock().max_size
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `key` is cached, without refreshing its recency.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.recency.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_inserted() {
        let cache = DigestCache::new(2);
        cache.insert("a".into(), "da".into());
        cache.insert("b".into(), "db".into());
        cache.insert("c".into(), "dc".into());
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn hit_refreshes_recency() {
        let cache = DigestCache::new(2);
        cache.insert("a".into(), "da".into());
        cache.insert("b".into(), "db".into());
        assert_eq!(cache.get("a").as_deref(), Some("da"));
        cache.insert("c".into(), "dc".into());
        // "b" was the least recently used after the hit on "a".
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
    }

    #[test]
    fn reinsert_refreshes_without_growing() {
        let cache = DigestCache::new(2);
        cache.insert("a".into(), "da".into());
        cache.insert("b".into(), "db".into());
        cache.insert("a".into(), "da2".into());
        assert_eq!(cache.len(), 2);
        cache.insert("c".into(), "dc".into());
        assert_eq!(cache.get("a").as_deref(), Some("da2"));
        assert!(!cache.contains("b"));
    }

    #[test]
    fn zero_capacity_never_stores() {
        let cache = DigestCache::new(0);
        cache.insert("a".into(), "da".into());
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn shrinking_evicts_oldest_synchronously() {
        let cache = DigestCache::new(4);
        for k in ["a", "b", "c", "d"] {
            cache.insert(k.into(), format!("d{k}"));
        }
        cache.set_max_size(2);
        assert_eq!(cache.len(), 2);
        assert!(cache.contains("c"));
        assert!(cache.contains("d"));
    }

    #[test]
    fn concurrent_inserts_respect_capacity() {
        let cache = std::sync::Arc::new(DigestCache::new(16));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let key = format!("{t}-{i}");
                        cache.insert(key.clone(), key);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(), 16);
    }
}
