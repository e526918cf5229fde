//! Request and Response models for the HTTP API
//!
//! DTOs used for serializing/deserializing HTTP request and response bodies.
//! Product bodies live in [`crate::catalog`].

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::InvalidateRequest;
pub use responses::{ErrorResponse, HealthResponse, InvalidateResponse, StatsResponse};
