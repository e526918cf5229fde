//! Background Tasks Module
//!
//! # Tasks
//! - Expiry Sweep: Optionally reclaims memory held by expired entries
//!
//! The invalidation listener lives in [`crate::bus`].

mod sweep;

pub use sweep::spawn_sweep_task;
