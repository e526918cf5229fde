//! Product records served through the cache.

use serde::{Deserialize, Serialize};

/// Maximum product name length in characters
pub const MAX_NAME_LENGTH: usize = 200;

/// Cache key under which a product is stored.
pub fn cache_key(id: i64) -> String {
    format!("product:{id}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
}

/// Request body for PUT /products/:id
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductUpdate {
    pub name: String,
    pub price_cents: i64,
}

impl ProductUpdate {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("Name cannot be empty".to_string());
        }
        if self.name.chars().count() > MAX_NAME_LENGTH {
            return Some(format!(
                "Name exceeds maximum length of {MAX_NAME_LENGTH} characters"
            ));
        }
        if self.price_cents < 0 {
            return Some("Price cannot be negative".to_string());
        }
        None
    }

    pub fn into_product(self, id: i64) -> Product {
        Product {
            id,
            name: self.name,
            price_cents: self.price_cents,
        }
    }
}
