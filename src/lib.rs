//! Coherent Cache - read-through TTL/LRU caching across processes
//!
//! Each process keeps a bounded, TTL-aware LRU cache in front of its
//! source of truth. Writes publish invalidations over a pub/sub channel so
//! peer caches drop stale copies; TTL bounds staleness when a message is
//! lost.

pub mod api;
pub mod bus;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_sweep_task;
