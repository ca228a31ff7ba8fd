//! Storage seam for the book catalog.

mod memory;
mod mongo;

pub use memory::MemoryBookStore;
pub use mongo::MongoBookStore;

use async_trait::async_trait;
use thiserror::Error;

use super::{
    id::BookId,
    models::{Book, BookChanges, NewBook},
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store error: {0}")]
    Backend(#[from] mongodb::error::Error),

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("book store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistent collection of book records.
///
/// Every method is a single operation against storage; callers get no
/// isolation across calls.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Store a new record and return the identifier storage assigned to it.
    async fn insert(&self, book: NewBook) -> StoreResult<BookId>;

    /// Every record, in storage-native order.
    async fn find_all(&self) -> StoreResult<Vec<Book>>;

    async fn find_by_id(&self, id: BookId) -> StoreResult<Option<Book>>;

    /// Apply `changes` to the record; returns how many records matched `id`.
    async fn update_by_id(&self, id: BookId, changes: BookChanges) -> StoreResult<u64>;

    /// Returns how many records were deleted.
    async fn delete_by_id(&self, id: BookId) -> StoreResult<u64>;

    /// Set `available` only if it currently equals `expected`, as one atomic
    /// step. Returns how many records matched both conditions.
    async fn set_available_if(
        &self,
        id: BookId,
        expected: bool,
        available: bool,
    ) -> StoreResult<u64>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
