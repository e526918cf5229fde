//! Invalidation Listener Module
//!
//! Background task that receives invalidation messages and deletes the
//! named keys from the local cache.
//!
//! # Failure handling
//! - Control frames from the broker are skipped.
//! - Undecodable payloads are logged and dropped; the next message is
//!   processed normally.
//! - A lost subscription is re-established with exponential backoff.
//! - Shutdown only interrupts the wait for the next frame, so a frame
//!   already received is always applied first.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::bus::{Frame, InvalidationBus, InvalidationMessage, Subscription, Transport};
use crate::cache::SharedCache;

// == Reconnect Policy ==
/// Delays between resubscription attempts.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl ReconnectPolicy {
    fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_delay)
    }
}

// == Listener Metrics ==
/// Counters describing what the listener has processed.
#[derive(Debug, Default)]
pub struct ListenerMetrics {
    messages: AtomicU64,
    keys: AtomicU64,
    malformed: AtomicU64,
    subscriptions: AtomicU64,
    subscribe_failures: AtomicU64,
}

/// Point-in-time copy of [`ListenerMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListenerSnapshot {
    /// Invalidation messages applied
    pub messages: u64,
    /// Keys named by applied messages
    pub keys: u64,
    /// Payloads dropped as undecodable
    pub malformed: u64,
    /// Successful subscriptions, including the first
    pub subscriptions: u64,
    /// Subscribe attempts that failed and were retried after a backoff
    pub subscribe_failures: u64,
}

impl ListenerMetrics {
    pub fn snapshot(&self) -> ListenerSnapshot {
        ListenerSnapshot {
            messages: self.messages.load(Ordering::Relaxed),
            keys: self.keys.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            subscriptions: self.subscriptions.load(Ordering::Relaxed),
            subscribe_failures: self.subscribe_failures.load(Ordering::Relaxed),
        }
    }
}

// == Listener Handle ==
/// Owns the running listener task.
pub struct ListenerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
    metrics: Arc<ListenerMetrics>,
}

impl ListenerHandle {
    pub fn metrics(&self) -> Arc<ListenerMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops receiving, releases the subscription, and waits for the task.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(err) = self.task.await {
            warn!(error = %err, "Invalidation listener ended abnormally");
        }
    }
}

/// Spawns the listener for `bus`'s channel, applying deletes to `cache`.
///
/// # Example
/// ```ignore
/// let handle = spawn_listener(&bus, cache.clone(), ReconnectPolicy::default());
/// // Later, during shutdown:
/// handle.shutdown().await;
/// ```
pub fn spawn_listener<V>(
    bus: &InvalidationBus,
    cache: SharedCache<V>,
    policy: ReconnectPolicy,
) -> ListenerHandle
where
    V: Send + 'static,
{
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let metrics = Arc::new(ListenerMetrics::default());

    let listener = Listener {
        transport: bus.transport(),
        channel: bus.channel().to_string(),
        cache,
        policy,
        metrics: Arc::clone(&metrics),
        shutdown: shutdown_rx,
    };

    ListenerHandle {
        shutdown: shutdown_tx,
        task: tokio::spawn(listener.run()),
        metrics,
    }
}

// == Listener Task ==
struct Listener<V> {
    transport: Arc<dyn Transport>,
    channel: String,
    cache: SharedCache<V>,
    policy: ReconnectPolicy,
    metrics: Arc<ListenerMetrics>,
    shutdown: watch::Receiver<bool>,
}

impl<V: Send + 'static> Listener<V> {
    async fn run(mut self) {
        info!(channel = %self.channel, "Starting invalidation listener");
        let mut delay = self.policy.initial_delay;

        while !self.stopping() {
            let subscribed = tokio::select! {
                _ = self.shutdown.changed() => break,
                result = self.transport.subscribe(&self.channel) => result,
            };

            match subscribed {
                Ok(subscription) => {
                    self.metrics.subscriptions.fetch_add(1, Ordering::Relaxed);
                    info!(channel = %self.channel, "Subscribed to invalidation channel");
                    delay = self.policy.initial_delay;

                    if self.drain(subscription).await.is_break() {
                        break;
                    }
                    warn!(channel = %self.channel, "Invalidation subscription lost");
                }
                Err(err) => {
                    self.metrics.subscribe_failures.fetch_add(1, Ordering::Relaxed);
                    warn!(channel = %self.channel, error = %err, "Subscribe failed");
                }
            }

            debug!(delay_ms = delay.as_millis() as u64, "Waiting before resubscribing");
            tokio::select! {
                _ = self.shutdown.changed() => break,
                _ = tokio::time::sleep(delay) => {}
            }
            delay = self.policy.next_delay(delay);
        }

        info!(channel = %self.channel, "Invalidation listener stopped");
    }

    /// Processes frames until the subscription ends (Continue) or
    /// shutdown is requested (Break). The subscription is dropped on return.
    async fn drain(
        &mut self,
        mut subscription: Box<dyn Subscription>,
    ) -> std::ops::ControlFlow<()> {
        loop {
            let frame = tokio::select! {
                biased;
                _ = self.shutdown.changed() => return std::ops::ControlFlow::Break(()),
                frame = subscription.next_frame() => frame,
            };

            match frame {
                None => return std::ops::ControlFlow::Continue(()),
                Some(Frame::Control(kind)) => {
                    debug!(channel = %self.channel, %kind, "Skipping control frame");
                }
                Some(Frame::Payload(body)) => self.apply(&body),
            }
        }
    }

    fn apply(&self, body: &[u8]) {
        let message = match InvalidationMessage::decode(body) {
            Ok(message) => message,
            Err(err) => {
                self.metrics.malformed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    channel = %self.channel,
                    error = %err,
                    payload = %String::from_utf8_lossy(body),
                    "Dropping malformed invalidation"
                );
                return;
            }
        };

        let removed = self.cache.delete_many(&message.keys);
        self.metrics.messages.fetch_add(1, Ordering::Relaxed);
        self.metrics
            .keys
            .fetch_add(message.keys.len() as u64, Ordering::Relaxed);
        debug!(
            origin = message.origin.as_deref().unwrap_or("unknown"),
            keys = message.keys.len(),
            removed,
            "Applied invalidation"
        );
    }

    fn stopping(&self) -> bool {
        *self.shutdown.borrow()
    }
}
