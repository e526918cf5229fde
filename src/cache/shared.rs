//! Shared Cache Module
//!
//! Cloneable handle that serializes every cache operation behind one lock.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::cache::{CacheStats, TtlLruCache};
use crate::error::ConfigError;

// == Shared Cache ==
/// Thread-safe handle to a [`TtlLruCache`].
///
/// `get` reorders recency, so there is no shared read path: request
/// handlers, the invalidation listener and the sweep task all take the
/// same exclusive lock. Critical sections only relink slots.
#[derive(Debug)]
pub struct SharedCache<V> {
    inner: Arc<Mutex<TtlLruCache<V>>>,
}

impl<V> Clone for SharedCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> SharedCache<V> {
    /// Creates a shared cache bounded to `capacity` entries.
    pub fn new(capacity: usize, default_ttl: Duration) -> Result<Self, ConfigError> {
        Ok(Self::from_cache(TtlLruCache::new(capacity, default_ttl)?))
    }

    pub fn from_cache(cache: TtlLruCache<V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    pub fn get(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().get(key)
    }

    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        self.inner.lock().set(key, value, ttl);
    }

    pub fn delete(&self, key: &str) -> bool {
        self.inner.lock().delete(key)
    }

    /// Deletes a batch of keys under one lock acquisition.
    ///
    /// Returns how many of them were present.
    pub fn delete_many<I, S>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cache = self.inner.lock();
        keys.into_iter()
            .filter(|key| cache.delete(key.as_ref()))
            .count()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    pub fn purge_expired(&self) -> usize {
        self.inner.lock().purge_expired()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Runs `f` with exclusive access to the underlying cache.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut TtlLruCache<V>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
