//! Publisher Module
//!
//! Publishes invalidation batches on the shared channel, tagged with this
//! process's origin id.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::bus::{InvalidationMessage, Transport};
use crate::error::BusError;

// == Invalidation Bus ==
/// Handle for publishing invalidations on one channel.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct InvalidationBus {
    transport: Arc<dyn Transport>,
    channel: String,
    origin: String,
}

impl std::fmt::Debug for InvalidationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvalidationBus")
            .field("channel", &self.channel)
            .field("origin", &self.origin)
            .finish()
    }
}

impl InvalidationBus {
    /// Creates a bus with a random origin identifier for this process.
    pub fn new(transport: Arc<dyn Transport>, channel: impl Into<String>) -> Self {
        Self {
            transport,
            channel: channel.into(),
            origin: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    // == Publish ==
    /// Publishes one message invalidating `keys`, in order.
    ///
    /// An empty batch emits nothing. Returns the number of keys sent.
    ///
    /// # Errors
    /// Substrate failures are returned to the caller; a lost invalidation
    /// leaves other processes stale until their TTL runs out.
    pub async fn publish(&self, keys: &[String]) -> Result<usize, BusError> {
        if keys.is_empty() {
            return Ok(0);
        }

        let payload = InvalidationMessage::new(keys.to_vec())
            .with_origin(self.origin.clone())
            .encode()?;

        match self.transport.publish(&self.channel, payload).await {
            Ok(()) => {
                debug!(channel = %self.channel, count = keys.len(), "Published invalidation");
                Ok(keys.len())
            }
            Err(err) => {
                warn!(channel = %self.channel, error = %err, ?keys, "Invalidation publish failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{Frame, MemoryTransport, Subscription, UnreachableTransport};
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_publish_encodes_keys_and_origin() {
        let transport = MemoryTransport::new();
        let bus = InvalidationBus::new(Arc::new(transport.clone()), "inv").with_origin("node-a");
        let mut sub = transport.subscribe("inv").await.unwrap();
        sub.next_frame().await;

        let sent = bus
            .publish(&["product:1".to_string(), "product:2".to_string()])
            .await
            .unwrap();
        assert_eq!(sent, 2);

        let Some(Frame::Payload(body)) = timeout(Duration::from_secs(1), sub.next_frame())
            .await
            .unwrap()
        else {
            panic!("expected a payload frame");
        };
        let msg = InvalidationMessage::decode(&body).unwrap();
        assert_eq!(msg.keys, vec!["product:1", "product:2"]);
        assert_eq!(msg.origin.as_deref(), Some("node-a"));
    }

    #[tokio::test]
    async fn test_empty_batch_emits_nothing() {
        let transport = MemoryTransport::new();
        let bus = InvalidationBus::new(Arc::new(transport.clone()), "inv");
        let mut sub = transport.subscribe("inv").await.unwrap();
        sub.next_frame().await;

        assert_eq!(bus.publish(&[]).await.unwrap(), 0);

        let next = timeout(Duration::from_millis(100), sub.next_frame()).await;
        assert!(next.is_err(), "no message should have been published");
    }

    #[tokio::test]
    async fn test_empty_batch_skips_unreachable_broker() {
        let bus = InvalidationBus::new(Arc::new(UnreachableTransport), "inv");
        assert_eq!(bus.publish(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_publish_failure_is_surfaced() {
        let bus = InvalidationBus::new(Arc::new(UnreachableTransport), "inv");
        let result = bus.publish(&["k".to_string()]).await;
        assert!(matches!(result, Err(BusError::Connection(_))));
    }

    #[test]
    fn test_origins_are_unique_per_bus() {
        let transport: Arc<dyn Transport> = Arc::new(MemoryTransport::new());
        let a = InvalidationBus::new(Arc::clone(&transport), "inv");
        let b = InvalidationBus::new(transport, "inv");
        assert_ne!(a.origin(), b.origin());
        assert_eq!(a.channel(), "inv");
    }
}
