//! Cart storage backends.
//!
//! [`CartBackend`] is the storage seam the cart service works against. Two
//! implementations exist: [`SqlCartBackend`] over a sea-orm connection and
//! [`InMemoryCartBackend`] for running without a database.
//! [`CompositeBackend`] selects between them per call.

use async_trait::async_trait;

use crate::entities::{CartLine, NewCartLine};
use crate::errors::ServiceError;

pub mod composite;
pub mod in_memory;
pub mod sql;

pub use composite::{BackendMode, CompositeBackend};
pub use in_memory::InMemoryCartBackend;
pub use sql::SqlCartBackend;

/// Storage primitives for cart lines
#[async_trait]
pub trait CartBackend: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    /// All lines, oldest first
    async fn list(&self) -> Result<Vec<CartLine>, ServiceError>;

    /// Every line referencing `catalog_item_id`, regardless of amount
    async fn find_by_catalog_item(
        &self,
        catalog_item_id: i32,
    ) -> Result<Vec<CartLine>, ServiceError>;

    /// Stores a new line, allocating its id and timestamps
    async fn insert(&self, line: NewCartLine) -> Result<CartLine, ServiceError>;

    /// Replaces a line's quantity and refreshes `updated_at`.
    /// Returns `None` when no line has that id.
    async fn set_quantity(&self, id: i32, quantity: i32)
        -> Result<Option<CartLine>, ServiceError>;

    /// Deletes one line; `false` when no line has that id
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;

    /// Deletes every line, returning how many were removed
    async fn clear(&self) -> Result<u64, ServiceError>;
}
