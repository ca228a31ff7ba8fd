use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::{BookStore, StoreError, StoreResult};
use crate::modules::books::{
    id::BookId,
    models::{Book, BookChanges, NewBook},
};

/// Process-local book store, kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryBookStore {
    books: RwLock<Vec<Book>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Vec<Book>>> {
        self.books.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Vec<Book>>> {
        self.books.write().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn insert(&self, book: NewBook) -> StoreResult<BookId> {
        let id = BookId::generate();
        self.write()?.push(book.into_book(id));
        Ok(id)
    }

    async fn find_all(&self) -> StoreResult<Vec<Book>> {
        Ok(self.read()?.clone())
    }

    async fn find_by_id(&self, id: BookId) -> StoreResult<Option<Book>> {
        Ok(self.read()?.iter().find(|book| book.id == id).cloned())
    }

    async fn update_by_id(&self, id: BookId, changes: BookChanges) -> StoreResult<u64> {
        let mut books = self.write()?;
        match books.iter_mut().find(|book| book.id == id) {
            Some(book) => {
                changes.apply_to(book);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_by_id(&self, id: BookId) -> StoreResult<u64> {
        let mut books = self.write()?;
        let before = books.len();
        books.retain(|book| book.id != id);
        Ok((before - books.len()) as u64)
    }

    async fn set_available_if(
        &self,
        id: BookId,
        expected: bool,
        available: bool,
    ) -> StoreResult<u64> {
        let mut books = self.write()?;
        match books
            .iter_mut()
            .find(|book| book.id == id && book.available == expected)
        {
            Some(book) => {
                book.available = available;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
