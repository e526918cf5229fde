//! Memory Transport Module
//!
//! In-process transport.
//!
//! A broadcast channel standing in for a broker: every subscription sees
//! every message published after it subscribed. Used for single-node runs
//! and for wiring several caches together in tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};
use tracing::warn;

use crate::bus::{Frame, Subscription, Transport};
use crate::error::BusError;

const DEFAULT_BUFFER: usize = 1024;

#[derive(Debug, Clone)]
struct Published {
    channel: Arc<str>,
    payload: Vec<u8>,
}

// == Memory Transport ==
/// Cloneable in-memory broker. Clones share the same message stream.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    sender: broadcast::Sender<Published>,
    epoch: Arc<watch::Sender<u64>>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::with_buffer(DEFAULT_BUFFER)
    }

    /// Creates a broker retaining up to `buffer` undelivered messages per
    /// subscriber; slower subscribers lose the oldest ones.
    pub fn with_buffer(buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer.max(1));
        let (epoch, _) = watch::channel(0);
        Self {
            sender,
            epoch: Arc::new(epoch),
        }
    }

    /// Drops every live subscription, as a broker restart would.
    pub fn disconnect_subscribers(&self) {
        self.epoch.send_modify(|epoch| *epoch += 1);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<(), BusError> {
        // Publishing with nobody listening is not an error for a broker
        let _ = self.sender.send(Published {
            channel: Arc::from(channel),
            payload,
        });
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> Result<Box<dyn Subscription>, BusError> {
        Ok(Box::new(MemorySubscription {
            channel: channel.to_string(),
            receiver: self.sender.subscribe(),
            epoch: self.epoch.subscribe(),
            confirmed: false,
        }))
    }
}

// == Subscription ==
struct MemorySubscription {
    channel: String,
    receiver: broadcast::Receiver<Published>,
    epoch: watch::Receiver<u64>,
    confirmed: bool,
}

#[async_trait]
impl Subscription for MemorySubscription {
    async fn next_frame(&mut self) -> Option<Frame> {
        if !self.confirmed {
            self.confirmed = true;
            return Some(Frame::Control(format!("subscribe {}", self.channel)));
        }

        loop {
            tokio::select! {
                _ = self.epoch.changed() => return None,
                received = self.receiver.recv() => match received {
                    Ok(msg) if *msg.channel == *self.channel => {
                        return Some(Frame::Payload(msg.payload));
                    }
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(channel = %self.channel, skipped, "Subscriber lagged, messages dropped");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                },
            }
        }
    }
}
