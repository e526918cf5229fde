//! API Module
//!
//! HTTP handlers and routing for the caching product service.
//!
//! # Endpoints
//! - `GET /products/:id` - Read-through product lookup
//! - `PUT /products/:id` - Upsert a product and invalidate it fleet-wide
//! - `GET /cache/stats` - Cache statistics
//! - `POST /cache/invalidate` - Publish an invalidation for arbitrary keys
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
