//! Catalog Module
//!
//! The read-through/write-invalidate coordinator and its backing store.

mod coordinator;
mod product;
mod store;

pub use coordinator::Coordinator;
pub use product::{cache_key, Product, ProductUpdate};
pub use store::{ProductStore, SqliteProductStore};
