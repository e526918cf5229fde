//! Cache Entry Module
//!
//! Defines the fixed-identity record stored in each arena slot.

use std::time::{Duration, Instant};

/// Upper bound applied to TTLs before computing an expiry instant.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

// == Cache Entry ==
/// A single cached value with its absolute expiry and recency links.
///
/// `prev` points toward the head (more recent), `next` toward the tail.
#[derive(Debug, Clone)]
pub struct Entry<V> {
    /// The key this entry is indexed under
    pub key: String,
    /// The stored value
    pub value: V,
    /// Instant at or after which the entry reads as absent
    pub expires_at: Instant,
    pub(crate) prev: Option<usize>,
    pub(crate) next: Option<usize>,
}

impl<V> Entry<V> {
    // == Constructor ==
    /// Creates an unlinked entry expiring `ttl` after `now`.
    pub fn new(key: String, value: V, now: Instant, ttl: Duration) -> Self {
        Self {
            key,
            value,
            expires_at: expiry_from(now, ttl),
            prev: None,
            next: None,
        }
    }

    // == Is Expired ==
    /// Checks expiry against a clock reading taken by the caller.
    ///
    /// Boundary condition: an entry whose expiry equals `now` is expired,
    /// so a zero TTL never produces a hit.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at <= now
    }

    // == Time To Live ==
    /// Returns remaining lifetime, zero once expired.
    pub fn ttl_remaining_at(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }

    /// Overwrites value and expiry in place, keeping identity and links.
    pub(crate) fn refresh(&mut self, value: V, now: Instant, ttl: Duration) {
        self.value = value;
        self.expires_at = expiry_from(now, ttl);
    }
}

/// Computes `now + ttl`, clamping absurd TTLs instead of overflowing.
pub(crate) fn expiry_from(now: Instant, ttl: Duration) -> Instant {
    now + ttl.min(MAX_TTL)
}
