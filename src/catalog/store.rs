//! Source-of-truth product storage.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::catalog::{Product, ProductUpdate};
use crate::error::StoreError;

/// Synchronous read/write contract the coordinator relies on.
///
/// Implementations may block; callers run them off the async workers.
pub trait ProductStore: Send + Sync + 'static {
    fn get(&self, id: i64) -> Result<Option<Product>, StoreError>;

    /// Inserts or replaces the product with `id`.
    fn upsert(&self, id: i64, update: &ProductUpdate) -> Result<Product, StoreError>;
}

const SEED: [(i64, &str, i64); 3] = [
    (1, "Keyboard", 4999),
    (2, "Mouse", 2999),
    (3, "Monitor", 15999),
];

/// SQLite-backed product table.
#[derive(Debug)]
pub struct SqliteProductStore {
    conn: Mutex<Connection>,
}

impl SqliteProductStore {
    /// Opens (or creates) the database at `path`. `:memory:` is accepted.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = if path == Path::new(":memory:") {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::open(":memory:")
    }

    /// Creates the schema and inserts sample rows into an empty table.
    ///
    /// Returns the number of rows seeded.
    pub fn init_and_seed(&self) -> Result<usize, StoreError> {
        let mut conn = self.conn.lock();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                price_cents INTEGER NOT NULL
            )",
        )?;

        let existing: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        if existing > 0 {
            return Ok(0);
        }

        let tx = conn.transaction()?;
        for (id, name, price_cents) in SEED {
            tx.execute(
                "INSERT INTO products (id, name, price_cents) VALUES (?1, ?2, ?3)",
                params![id, name, price_cents],
            )?;
        }
        tx.commit()?;

        info!("Seeded {} products", SEED.len());
        Ok(SEED.len())
    }
}

impl ProductStore for SqliteProductStore {
    fn get(&self, id: i64) -> Result<Option<Product>, StoreError> {
        let conn = self.conn.lock();
        let product = conn
            .query_row(
                "SELECT id, name, price_cents FROM products WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Product {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        price_cents: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(product)
    }

    fn upsert(&self, id: i64, update: &ProductUpdate) -> Result<Product, StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO products (id, name, price_cents) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, price_cents = excluded.price_cents",
            params![id, update.name, update.price_cents],
        )?;
        Ok(update.clone().into_product(id))
    }
}
