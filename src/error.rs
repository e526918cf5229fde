//! Error types for the cache service
//!
//! One `thiserror` enum per concern: configuration, the invalidation bus,
//! the backing store, and the HTTP surface that folds them together.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Configuration Errors ==
/// Startup configuration problems. All of them are fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is absent
    #[error("missing required configuration variable {0}")]
    Missing(String),

    /// A variable is present but cannot be used
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: String,
        value: String,
        reason: String,
    },

    /// The cache could never satisfy its capacity bound
    #[error("cache capacity must be a positive integer")]
    ZeroCapacity,
}

// == Invalidation Bus Errors ==
/// Failures of the messaging substrate or of message decoding.
#[derive(Error, Debug)]
pub enum BusError {
    /// Could not reach the messaging endpoint
    #[error("bus connection failed: {0}")]
    Connection(String),

    /// A publish was not accepted by the substrate
    #[error("publish failed: {0}")]
    Publish(String),

    /// Subscribing to the channel failed
    #[error("subscribe failed: {0}")]
    Subscribe(String),

    /// A payload could not be encoded or decoded
    #[error("malformed invalidation payload: {0}")]
    Decode(String),
}

impl From<redis::RedisError> for BusError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
            BusError::Connection(err.to_string())
        } else {
            BusError::Publish(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BusError {
    fn from(err: serde_json::Error) -> Self {
        BusError::Decode(err.to_string())
    }
}

// == Backing Store Errors ==
/// Failures of the source-of-truth store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

// == API Error Enum ==
/// Unified error type for the HTTP surface.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Record not found in the backing store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Source-of-truth read or write failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The write landed but its invalidation could not be published
    #[error("Invalidation not published: {0}")]
    Invalidation(#[from] BusError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Invalidation(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP surface.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let test_cases = vec![
            (ApiError::NotFound("product 9".to_string()), StatusCode::NOT_FOUND),
            (ApiError::InvalidRequest("bad".to_string()), StatusCode::BAD_REQUEST),
            (
                ApiError::Invalidation(BusError::Publish("down".to_string())),
                StatusCode::BAD_GATEWAY,
            ),
            (ApiError::Internal("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected_status) in test_cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);
        }
    }

    #[test]
    fn test_serde_error_maps_to_decode() {
        let err: BusError = serde_json::from_str::<serde_json::Value>("{nope")
            .unwrap_err()
            .into();
        assert!(matches!(err, BusError::Decode(_)));
    }

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::Missing("REDIS_URL".to_string());
        assert!(err.to_string().contains("REDIS_URL"));
        assert!(ConfigError::ZeroCapacity.to_string().contains("positive"));
    }
}
