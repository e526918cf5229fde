//! Cache Store Module
//!
//! TTL-aware LRU engine combining a key index with the arena recency list.
//! Expiry is lazy: entries are checked when read, never on a timer.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::cache::{CacheStats, Entry, RecencyList};
use crate::error::ConfigError;

// == Cache Store ==
/// Single-process TTL/LRU cache.
///
/// Not synchronized; wrap it in [`SharedCache`](crate::cache::SharedCache)
/// to share between tasks.
#[derive(Debug)]
pub struct TtlLruCache<V> {
    /// Key to arena slot
    index: HashMap<String, usize>,
    /// Recency ordering owning the entries
    order: RecencyList<V>,
    /// Performance statistics
    stats: CacheStats,
    capacity: usize,
    default_ttl: Duration,
}

impl<V> TtlLruCache<V> {
    // == Constructor ==
    /// Creates a cache bounded to `capacity` entries.
    ///
    /// # Errors
    /// Returns [`ConfigError::ZeroCapacity`] when `capacity` is 0.
    pub fn new(capacity: usize, default_ttl: Duration) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self {
            index: HashMap::with_capacity(capacity),
            order: RecencyList::with_capacity(capacity),
            stats: CacheStats::new(capacity, default_ttl.as_secs()),
            capacity,
            default_ttl,
        })
    }

    // == Get ==
    /// Retrieves a live value and marks it most recently used.
    ///
    /// Expired entries are removed and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        self.get_at(key, Instant::now())
    }

    /// [`get`](Self::get) with the clock read supplied by the caller.
    pub fn get_at(&mut self, key: &str, now: Instant) -> Option<V>
    where
        V: Clone,
    {
        let Some(&idx) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        let expired = self.order.get(idx).map_or(true, |e| e.is_expired_at(now));
        if expired {
            self.index.remove(key);
            self.order.remove(idx);
            self.stats.record_miss();
            return None;
        }

        self.order.move_to_front(idx);
        self.stats.record_hit();
        self.order.get(idx).map(|e| e.value.clone())
    }

    // == Set ==
    /// Stores a value, using the default TTL when `ttl` is None.
    ///
    /// Overwriting an existing key updates it in place and never evicts.
    /// Inserting a new key evicts from the tail while over capacity,
    /// regardless of whether the tail entry has expired.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        self.set_at(key, value, ttl, Instant::now());
    }

    /// [`set`](Self::set) with the clock read supplied by the caller.
    pub fn set_at(&mut self, key: impl Into<String>, value: V, ttl: Option<Duration>, now: Instant) {
        let key = key.into();
        let ttl = ttl.unwrap_or(self.default_ttl);

        if let Some(&idx) = self.index.get(&key) {
            if let Some(entry) = self.order.get_mut(idx) {
                entry.refresh(value, now, ttl);
            }
            self.order.move_to_front(idx);
            return;
        }

        let idx = self.order.push_front(Entry::new(key.clone(), value, now, ttl));
        self.index.insert(key, idx);
        self.evict_overflow();
    }

    // == Delete ==
    /// Removes an entry. Returns whether anything was removed.
    ///
    /// Deleting an absent key is a no-op and touches no counters.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.index.remove(key) {
            Some(idx) => self.order.remove(idx).is_some(),
            None => false,
        }
    }

    // == Stats ==
    /// Returns a consistent snapshot of counters and size.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.index.len())
    }

    // == Purge Expired ==
    /// Removes every expired entry. Returns the number removed.
    ///
    /// Optional housekeeping; correctness never depends on it. Purged
    /// entries count neither as misses nor as evictions.
    pub fn purge_expired(&mut self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&mut self, now: Instant) -> usize {
        let expired: Vec<(String, usize)> = self
            .index
            .iter()
            .filter(|(_, idx)| self.order.get(**idx).map_or(true, |e| e.is_expired_at(now)))
            .map(|(key, idx)| (key.clone(), *idx))
            .collect();

        for (key, idx) in &expired {
            self.index.remove(key);
            self.order.remove(*idx);
        }
        expired.len()
    }

    // == Introspection ==
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Keys from most to least recently used. Does not affect recency.
    pub fn keys_by_recency(&self) -> Vec<String> {
        self.order.iter().map(|e| e.key.clone()).collect()
    }

    fn evict_overflow(&mut self) {
        while self.index.len() > self.capacity {
            let Some(tail) = self.order.tail() else { break };
            if let Some(evicted) = self.order.remove(tail) {
                self.index.remove(&evicted.key);
                self.stats.record_eviction();
            }
        }
    }

    /// Panics unless the index and the recency list hold the same entries.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.index.len(), self.order.len(), "index/list size mismatch");
        assert!(self.index.len() <= self.capacity, "capacity exceeded");
        for entry in self.order.iter() {
            let idx = self.index.get(&entry.key).copied();
            assert!(idx.is_some(), "listed key {} missing from index", entry.key);
            assert_eq!(
                self.order.get(idx.unwrap_or(usize::MAX)).map(|e| e.key.as_str()),
                Some(entry.key.as_str()),
                "index points at the wrong slot"
            );
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(30);

    fn cache(capacity: usize) -> TtlLruCache<String> {
        TtlLruCache::new(capacity, TTL).unwrap()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = TtlLruCache::<String>::new(0, TTL);
        assert!(matches!(result, Err(ConfigError::ZeroCapacity)));
    }

    #[test]
    fn test_set_and_get() {
        let mut store = cache(100);
        store.set("key1", "value1".to_string(), None);

        assert_eq!(store.get("key1"), Some("value1".to_string()));
        assert_eq!(store.len(), 1);
        store.assert_consistent();
    }

    #[test]
    fn test_get_nonexistent_counts_miss() {
        let mut store = cache(100);
        assert_eq!(store.get("nonexistent"), None);

        let stats = store.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_zero_ttl_expires_on_next_read() {
        let mut store = cache(100);
        store.set("k", "v".to_string(), Some(Duration::ZERO));

        assert_eq!(store.get("k"), None);
        let stats = store.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.size, 0, "lazy expiry removes the entry");
        store.assert_consistent();
    }

    #[test]
    fn test_ttl_expiration_with_explicit_clock() {
        let mut store = cache(100);
        let t0 = Instant::now();
        store.set_at("k", "v".to_string(), Some(Duration::from_secs(5)), t0);

        assert!(store.get_at("k", t0 + Duration::from_secs(4)).is_some());
        assert!(store.get_at("k", t0 + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn test_default_ttl_applied() {
        let mut store = cache(100);
        let t0 = Instant::now();
        store.set_at("k", "v".to_string(), None, t0);

        assert!(store.get_at("k", t0 + TTL - Duration::from_millis(1)).is_some());
        assert!(store.get_at("k", t0 + TTL).is_none());
    }

    #[test]
    fn test_overwrite_in_place() {
        let mut store = cache(100);
        let t0 = Instant::now();
        store.set_at("key1", "value1".to_string(), Some(Duration::ZERO), t0);
        store.set_at("key1", "value2".to_string(), Some(Duration::from_secs(60)), t0);

        assert_eq!(store.get_at("key1", t0), Some("value2".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let mut store = cache(1);
        for i in 0..50 {
            store.set("a", format!("v{i}"), None);
        }

        assert_eq!(store.stats().evictions, 0);
        assert_eq!(store.get("a"), Some("v49".to_string()));
    }

    #[test]
    fn test_eviction_counting() {
        let mut store = cache(2);
        store.set("a", "1".to_string(), None);
        store.set("b", "2".to_string(), None);
        store.set("c", "3".to_string(), None);

        assert_eq!(store.stats().evictions, 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.keys_by_recency(), vec!["c", "b"]);
        store.assert_consistent();
    }

    #[test]
    fn test_get_refreshes_recency() {
        let mut store = cache(3);
        store.set("a", "1".to_string(), None);
        store.set("b", "2".to_string(), None);
        store.set("c", "3".to_string(), None);
        store.get("a");

        // Tail-first eviction order is now b, c, a
        store.set("d", "4".to_string(), None);
        assert_eq!(store.keys_by_recency(), vec!["d", "a", "c"]);
        store.set("e", "5".to_string(), None);
        assert_eq!(store.keys_by_recency(), vec!["e", "d", "a"]);
        store.set("f", "6".to_string(), None);
        assert_eq!(store.keys_by_recency(), vec!["f", "e", "d"]);
        assert_eq!(store.stats().evictions, 3);
    }

    #[test]
    fn test_eviction_ignores_staleness() {
        let mut store = cache(2);
        let t0 = Instant::now();
        store.set_at("fresh", "1".to_string(), None, t0);
        store.set_at("stale", "2".to_string(), Some(Duration::ZERO), t0);

        // The tail is evicted even though a more recent entry is expired
        store.set_at("new", "3".to_string(), None, t0);
        assert_eq!(store.keys_by_recency(), vec!["new", "stale"]);
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_delete() {
        let mut store = cache(100);
        store.set("key1", "value1".to_string(), None);

        assert!(store.delete("key1"));
        assert!(store.is_empty());
        assert_eq!(store.get("key1"), None);
        store.assert_consistent();
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut store = cache(100);
        store.set("key1", "value1".to_string(), None);
        let before = store.stats();

        assert!(!store.delete("missing"));
        assert!(!store.delete("missing"));
        assert_eq!(store.stats(), before);
    }

    #[test]
    fn test_stats_snapshot() {
        let mut store = cache(100);
        store.set("key1", "value1".to_string(), None);
        store.get("key1");
        store.get("nonexistent");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
        assert_eq!(stats.capacity, 100);
        assert_eq!(stats.default_ttl_s, 30);
    }

    #[test]
    fn test_purge_expired() {
        let mut store = cache(100);
        let t0 = Instant::now();
        store.set_at("key1", "value1".to_string(), Some(Duration::from_secs(1)), t0);
        store.set_at("key2", "value2".to_string(), Some(Duration::from_secs(10)), t0);

        let removed = store.purge_expired_at(t0 + Duration::from_secs(2));

        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().misses, 0);
        assert_eq!(store.stats().evictions, 0);
        assert!(store.get_at("key2", t0 + Duration::from_secs(2)).is_some());
        store.assert_consistent();
    }
}
