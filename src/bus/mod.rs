//! Invalidation Bus Module
//!
//! Fire-and-forget pub/sub channel carrying batches of invalidated keys
//! between cache-holding processes. Delivery is best-effort; entry TTLs
//! bound staleness when a message is lost.

mod listener;
mod memory;
mod message;
mod publisher;
mod redis_transport;
mod transport;

pub use listener::{
    spawn_listener, ListenerHandle, ListenerMetrics, ListenerSnapshot, ReconnectPolicy,
};
pub use memory::MemoryTransport;
pub use message::InvalidationMessage;
pub use publisher::InvalidationBus;
pub use redis_transport::RedisTransport;
pub use transport::{Frame, Subscription, Transport};

#[cfg(test)]
pub(crate) use transport::UnreachableTransport;

/// Channel shared by every process in the fleet.
pub const DEFAULT_CHANNEL: &str = "cache.invalidate";
