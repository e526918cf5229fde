//! Transport Module
//!
//! Messaging substrate abstraction.
//!
//! The bus talks to its broker through these traits so the Redis
//! transport and the in-process transport are interchangeable.

use async_trait::async_trait;

use crate::error::BusError;

// == Frames ==
/// One unit received from a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Broker bookkeeping such as a subscription confirmation
    Control(String),
    /// A message body published on the channel
    Payload(Vec<u8>),
}

// == Transport Traits ==
/// Publishing side of a broker connection.
///
/// Publish connections may be shared by any number of callers.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Hands `payload` to the broker for delivery on `channel`.
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<(), BusError>;

    /// Opens a dedicated subscription to `channel`.
    async fn subscribe(&self, channel: &str) -> Result<Box<dyn Subscription>, BusError>;
}

/// A live subscription, owned by exactly one listener.
#[async_trait]
pub trait Subscription: Send {
    /// Waits for the next frame. `None` means the connection is gone and
    /// the caller should resubscribe. Must be cancel-safe.
    async fn next_frame(&mut self) -> Option<Frame>;
}

// == Test Doubles ==
/// Transport whose broker can never be reached.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct UnreachableTransport;

#[cfg(test)]
#[async_trait]
impl Transport for UnreachableTransport {
    async fn publish(&self, _channel: &str, _payload: Vec<u8>) -> Result<(), BusError> {
        Err(BusError::Connection("connection refused".to_string()))
    }

    async fn subscribe(&self, _channel: &str) -> Result<Box<dyn Subscription>, BusError> {
        Err(BusError::Connection("connection refused".to_string()))
    }
}
