//! Request DTOs for the HTTP API

use serde::Deserialize;

/// Request body for POST /cache/invalidate
///
/// # Fields
/// - `keys`: Cache keys to drop on every node, in order
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    pub keys: Vec<String>,
}

impl InvalidateRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.keys.iter().any(|k| k.is_empty()) {
            return Some("Keys cannot be empty strings".to_string());
        }
        None
    }
}
