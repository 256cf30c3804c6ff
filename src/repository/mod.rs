//! Repository layer: the `BookStore` seam and its implementations

pub mod memory;
pub mod mongo;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    config::{DatabaseConfig, StoreBackend},
    models::book::{Book, BookInput, BookQuery, NewBook},
};

pub use memory::MemoryBookStore;
pub use mongo::MongoBookStore;

/// Failures reported by a store, already classified by the adapter
#[derive(Error, Debug)]
pub enum StoreError {
    /// A write would break a declared constraint (e.g. negative stock)
    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// The store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Bulk delete selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePredicate {
    All,
    /// `availableCopies == 0`; a missing field does not match
    OutOfStock,
}

/// Result of a guarded stock change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockOutcome {
    Adjusted(Book),
    /// The change would take stock below zero; nothing was written
    Insufficient,
    /// The change would overflow a 32-bit count; nothing was written
    OutOfRange,
    NotFound,
}

/// Document-store operations needed by the inventory service.
///
/// Implementations enforce the non-negative stock constraint on every write
/// on their own, so it holds even for callers that skip the service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Books matching `query`, in the store's natural order
    async fn find(&self, query: &BookQuery) -> StoreResult<Vec<Book>>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Book>>;

    async fn insert(&self, book: NewBook) -> StoreResult<Book>;

    async fn insert_many(&self, books: Vec<NewBook>) -> StoreResult<Vec<Book>>;

    /// Sets the supplied fields and returns the record after the update
    async fn update_by_id(&self, id: &str, patch: &BookInput) -> StoreResult<Option<Book>>;

    /// Adds `delta` to `availableCopies` (absent counts as zero) only if
    /// the result stays within `0..=i32::MAX`. A zero delta writes nothing.
    async fn adjust_stock(&self, id: &str, delta: i32) -> StoreResult<StockOutcome>;

    /// Returns the number of removed records (0 or 1)
    async fn delete_by_id(&self, id: &str) -> StoreResult<u64>;

    async fn delete_many(&self, predicate: DeletePredicate) -> StoreResult<u64>;

    async fn ping(&self) -> StoreResult<()>;

    /// Releases the underlying connection
    async fn close(&self);
}

/// Opens the configured store and prepares it for use.
pub async fn connect(config: &DatabaseConfig) -> StoreResult<Arc<dyn BookStore>> {
    match config.backend {
        StoreBackend::Mongo => {
            let store = MongoBookStore::connect(config).await?;
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory book store; data is lost on shutdown");
            Ok(Arc::new(MemoryBookStore::new()))
        }
    }
}
