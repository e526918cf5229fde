//! Cache Coordinator
//!
//! Read path: cache first, source of truth on miss, then populate.
//! Write path: source of truth, local delete, then publish invalidation.
//! Store I/O runs on the blocking pool and never under the cache lock.

use std::sync::Arc;

use tracing::{debug, error};

use crate::bus::InvalidationBus;
use crate::cache::{CacheStats, SharedCache};
use crate::catalog::{cache_key, Product, ProductStore, ProductUpdate};
use crate::error::{ApiError, Result, StoreError};

#[derive(Clone)]
pub struct Coordinator {
    cache: SharedCache<Product>,
    store: Arc<dyn ProductStore>,
    bus: InvalidationBus,
}

impl Coordinator {
    pub fn new(cache: SharedCache<Product>, store: Arc<dyn ProductStore>, bus: InvalidationBus) -> Self {
        Self { cache, store, bus }
    }

    pub fn cache(&self) -> &SharedCache<Product> {
        &self.cache
    }

    // == Read Through ==
    /// Returns the product, consulting the store only on a cache miss.
    pub async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        let key = cache_key(id);
        if let Some(product) = self.cache.get(&key) {
            debug!(%key, "Cache hit");
            return Ok(Some(product));
        }

        let store = Arc::clone(&self.store);
        let found = run_blocking(move || store.get(id)).await?;

        if let Some(product) = &found {
            self.cache.set(key, product.clone(), None);
        }
        Ok(found)
    }

    // == Write ==
    /// Upserts the product, then invalidates it here and on every peer.
    ///
    /// # Errors
    /// [`ApiError::Invalidation`] means the write is durable but peers may
    /// serve the old value until their entry expires.
    pub async fn put_product(&self, id: i64, update: ProductUpdate) -> Result<Product> {
        if let Some(msg) = update.validate() {
            return Err(ApiError::InvalidRequest(msg));
        }

        let store = Arc::clone(&self.store);
        let product = run_blocking(move || store.upsert(id, &update)).await?;

        self.invalidate(vec![cache_key(id)]).await?;
        Ok(product)
    }

    // == Invalidate ==
    /// Deletes `keys` locally and publishes them to peers.
    ///
    /// Returns the number of keys published; an empty batch publishes nothing.
    pub async fn invalidate(&self, keys: Vec<String>) -> Result<usize> {
        self.cache.delete_many(&keys);

        self.bus.publish(&keys).await.map_err(|err| {
            error!(error = %err, ?keys, "Invalidation was not published");
            ApiError::Invalidation(err)
        })
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> std::result::Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("store task failed: {e}")))?
        .map_err(ApiError::from)
}
