//! API Handlers
//!
//! HTTP request handlers for each endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::bus::ListenerMetrics;

use crate::catalog::{Coordinator, Product, ProductUpdate};
use crate::error::{ApiError, Result};
use crate::models::{HealthResponse, InvalidateRequest, InvalidateResponse, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Coordinator,
    /// Counters of the invalidation listener feeding this cache
    pub listener: Arc<ListenerMetrics>,
}

impl AppState {
    pub fn new(coordinator: Coordinator, listener: Arc<ListenerMetrics>) -> Self {
        Self {
            coordinator,
            listener,
        }
    }
}

/// Handler for GET /products/:id
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>> {
    state
        .coordinator
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("product {id}")))
}

/// Handler for PUT /products/:id
pub async fn put_product_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ProductUpdate>,
) -> Result<Json<Product>> {
    let product = state.coordinator.put_product(id, req).await?;
    Ok(Json(product))
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.coordinator.stats(),
        state.listener.snapshot(),
    ))
}

/// Handler for POST /cache/invalidate
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let published = state.coordinator.invalidate(req.keys).await?;
    Ok(Json(InvalidateResponse { published }))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{InvalidationBus, MemoryTransport};
    use crate::cache::SharedCache;
    use crate::catalog::SqliteProductStore;
    use std::time::Duration;

    fn test_state() -> AppState {
        let store = SqliteProductStore::open_in_memory().unwrap();
        store.init_and_seed().unwrap();
        let cache = SharedCache::new(100, Duration::from_secs(30)).unwrap();
        let bus = InvalidationBus::new(Arc::new(MemoryTransport::new()), "inv");
        let listener = Arc::new(ListenerMetrics::default());
        AppState::new(Coordinator::new(cache, Arc::new(store), bus), listener)
    }

    #[tokio::test]
    async fn test_get_product_handler() {
        let state = test_state();

        let response = get_product_handler(State(state), Path(3)).await.unwrap();
        assert_eq!(response.name, "Monitor");
    }

    #[tokio::test]
    async fn test_get_nonexistent_product() {
        let result = get_product_handler(State(test_state()), Path(404)).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let state = test_state();
        let req = ProductUpdate {
            name: "Monitor Arm".to_string(),
            price_cents: 8900,
        };

        put_product_handler(State(state.clone()), Path(3), Json(req))
            .await
            .unwrap();

        let response = get_product_handler(State(state), Path(3)).await.unwrap();
        assert_eq!(response.name, "Monitor Arm");
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();
        get_product_handler(State(state.clone()), Path(1)).await.unwrap();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 1);
        assert_eq!(response.size, 1);
    }

    #[tokio::test]
    async fn test_invalidate_handler_rejects_blank_key() {
        let req = InvalidateRequest {
            keys: vec![String::new()],
        };
        let result = invalidate_handler(State(test_state()), Json(req)).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
