//! Response DTOs for the HTTP API

use serde::Serialize;

use crate::bus::ListenerSnapshot;
use crate::cache::CacheStats;

/// Response body for the stats endpoint (GET /cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Current number of entries in cache
    pub size: usize,
    /// Maximum number of entries
    pub capacity: usize,
    /// Default TTL in seconds
    pub default_ttl_s: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Invalidation listener counters
    pub listener: ListenerSnapshot,
}

impl StatsResponse {
    pub fn new(stats: CacheStats, listener: ListenerSnapshot) -> Self {
        Self {
            listener,
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            size: stats.size,
            capacity: stats.capacity,
            default_ttl_s: stats.default_ttl_s,
        }
    }
}

/// Response body for POST /cache/invalidate
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Number of keys published to peers
    pub published: usize,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_from_snapshot() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            evictions: 5,
            size: 100,
            capacity: 256,
            default_ttl_s: 20,
        };
        let resp = StatsResponse::new(stats, ListenerSnapshot::default());
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.size, 100);
        assert_eq!(resp.capacity, 256);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::new(CacheStats::new(10, 20), ListenerSnapshot::default());
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_stats_response_nests_listener_counters() {
        let listener = ListenerSnapshot {
            messages: 3,
            keys: 5,
            malformed: 1,
            subscriptions: 2,
            subscribe_failures: 4,
        };
        let resp = StatsResponse::new(CacheStats::new(10, 20), listener);

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["listener"]["malformed"], 1);
        assert_eq!(json["listener"]["subscriptions"], 2);
        assert_eq!(json["listener"]["subscribe_failures"], 4);
        assert_eq!(json["capacity"], 10);
    }

    #[test]
    fn test_health_response_serialize() {
        let json = serde_json::to_string(&HealthResponse::healthy()).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let json = serde_json::to_string(&ErrorResponse::new("Something went wrong")).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
