//! Redis Transport Module
//!
//! Publishing goes through one multiplexed connection shared by all
//! callers and re-established after a failure. Each subscription opens
//! its own dedicated pub/sub connection.
//!
//! Every broker round trip is bounded by the transport's timeout, so a
//! broker that accepts connections but never answers surfaces as an error
//! instead of a stalled caller.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, Msg, RedisResult};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::bus::{Frame, Subscription, Transport};
use crate::error::BusError;

/// Upper bound on any single connect, publish or subscribe round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

// == Redis Transport ==
/// Transport backed by a Redis server.
pub struct RedisTransport {
    client: Client,
    publisher: Mutex<Option<MultiplexedConnection>>,
    timeout: Duration,
}

impl std::fmt::Debug for RedisTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisTransport")
            .field("addr", &self.client.get_connection_info().addr)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RedisTransport {
    /// Validates `url` without connecting; connections are opened lazily.
    pub fn new(url: &str) -> Result<Self, BusError> {
        let client = Client::open(url)
            .map_err(|e| BusError::Connection(format!("invalid redis url {url:?}: {e}")))?;
        Ok(Self {
            client,
            publisher: Mutex::new(None),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Replaces the per-round-trip timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn publish_connection(&self) -> Result<MultiplexedConnection, BusError> {
        if let Some(conn) = self.publisher.lock().await.as_ref() {
            return Ok(conn.clone());
        }

        // Slot is not held across the connect
        let conn = bounded(self.timeout, "connect", self.client.get_multiplexed_async_connection())
            .await
            .map_err(|err| match err {
                Bounded::Elapsed(msg) => BusError::Connection(msg),
                Bounded::Failed(err) => BusError::from(err),
            })?;

        let mut slot = self.publisher.lock().await;
        match slot.as_ref() {
            Some(existing) => Ok(existing.clone()),
            None => {
                info!("Connected publish connection to redis");
                *slot = Some(conn.clone());
                Ok(conn)
            }
        }
    }
}

// == Bounded Round Trips ==
enum Bounded {
    Elapsed(String),
    Failed(redis::RedisError),
}

async fn bounded<T, F>(limit: Duration, what: &str, fut: F) -> Result<T, Bounded>
where
    F: Future<Output = RedisResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(Bounded::Failed(err)),
        Err(_) => Err(Bounded::Elapsed(format!(
            "redis {what} got no response within {}ms",
            limit.as_millis()
        ))),
    }
}

#[async_trait]
impl Transport for RedisTransport {
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<(), BusError> {
        let mut conn = self.publish_connection().await?;
        let result: Result<i64, Bounded> =
            bounded(self.timeout, "publish", conn.publish(channel, payload)).await;

        match result {
            Ok(receivers) => {
                debug!(channel, receivers, "Published to redis");
                Ok(())
            }
            Err(err) => {
                *self.publisher.lock().await = None;
                let err = match err {
                    Bounded::Elapsed(msg) => BusError::Connection(msg),
                    Bounded::Failed(err) => BusError::from(err),
                };
                warn!(channel, error = %err, "Redis publish failed, dropping connection");
                Err(err)
            }
        }
    }

    async fn subscribe(&self, channel: &str) -> Result<Box<dyn Subscription>, BusError> {
        let subscribe_error = |err: Bounded| match err {
            Bounded::Elapsed(msg) => BusError::Subscribe(msg),
            Bounded::Failed(err) => BusError::Subscribe(err.to_string()),
        };

        let mut pubsub = bounded(self.timeout, "connect", self.client.get_async_pubsub())
            .await
            .map_err(subscribe_error)?;
        bounded(self.timeout, "subscribe", pubsub.subscribe(channel))
            .await
            .map_err(subscribe_error)?;

        Ok(Box::new(RedisSubscription {
            channel: channel.to_string(),
            messages: Box::pin(pubsub.into_on_message()),
            confirmed: false,
        }))
    }
}

// == Subscription ==
struct RedisSubscription {
    channel: String,
    messages: Pin<Box<dyn Stream<Item = Msg> + Send>>,
    confirmed: bool,
}

#[async_trait]
impl Subscription for RedisSubscription {
    async fn next_frame(&mut self) -> Option<Frame> {
        // The client consumes SUBSCRIBE replies itself; surface the
        // acknowledgement once so listeners see the same frame sequence
        // as with any other broker.
        if !self.confirmed {
            self.confirmed = true;
            return Some(Frame::Control(format!("subscribe {}", self.channel)));
        }

        let msg = self.messages.next().await?;
        Some(Frame::Payload(msg.get_payload_bytes().to_vec()))
    }
}
