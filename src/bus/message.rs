//! Invalidation Message Module
//!
//! Wire format for invalidations.
//!
//! UTF-8 JSON document with a required `keys` array. `origin` is optional
//! and unknown fields are ignored so other producers can interoperate.

use serde::{Deserialize, Serialize};

use crate::error::BusError;

// == Invalidation Message ==
/// A batch of keys whose cached values must be discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidationMessage {
    pub keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl InvalidationMessage {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys, origin: None }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Serializes to the JSON body published on the channel.
    pub fn encode(&self) -> Result<Vec<u8>, BusError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parses a received body. Non-UTF-8 input and any shape other than
    /// an object with a string-array `keys` field is rejected.
    pub fn decode(payload: &[u8]) -> Result<Self, BusError> {
        Ok(serde_json::from_slice(payload)?)
    }
}
