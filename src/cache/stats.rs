//! Cache Statistics Module
//!
//! Tracks hits, misses, and evictions, and produces point-in-time snapshots.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache performance and shape.
///
/// Produced under the cache lock, so all fields describe the same instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted due to LRU pressure
    pub evictions: u64,
    /// Current number of entries, including expired-but-unread ones
    pub size: usize,
    /// Maximum number of entries
    pub capacity: usize,
    /// TTL applied when `set` is called without one, in seconds
    pub default_ttl_s: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates zeroed counters for a cache of the given shape.
    pub fn new(capacity: usize, default_ttl_s: u64) -> Self {
        Self {
            capacity,
            default_ttl_s,
            ..Self::default()
        }
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have happened.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Copies the counters with the given live size filled in.
    pub(crate) fn snapshot(&self, size: usize) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new(256, 20);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.size, 0);
        assert_eq!(stats.capacity, 256);
        assert_eq!(stats.default_ttl_s, 20);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::new(1, 1).hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new(1, 1);
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_snapshot_fills_size() {
        let mut stats = CacheStats::new(10, 30);
        stats.record_eviction();

        let snap = stats.snapshot(4);
        assert_eq!(snap.size, 4);
        assert_eq!(snap.evictions, 1);
        assert_eq!(snap.capacity, 10);
        assert_eq!(stats.size, 0, "snapshot must not mutate the counters");
    }

    #[test]
    fn test_stats_serialize_field_names() {
        let json = serde_json::to_value(CacheStats::new(2, 20)).unwrap();
        for field in ["hits", "misses", "evictions", "size", "capacity", "default_ttl_s"] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
    }
}
