//! Book catalog operations and the available/borrowed state machine.

use std::sync::Arc;

use shelf_kernel::settings::BorrowMode;

use super::{
    error::BookError,
    id::BookId,
    models::{Book, BookChanges, BookPayload, Transition},
    store::BookStore,
};

/// Catalog operations over an injected [`BookStore`].
///
/// Holds no state of its own; cloning shares the store.
#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn BookStore>,
    borrow_mode: BorrowMode,
}

impl BookService {
    pub fn new(store: Arc<dyn BookStore>, borrow_mode: BorrowMode) -> Self {
        Self { store, borrow_mode }
    }

    pub fn borrow_mode(&self) -> BorrowMode {
        self.borrow_mode
    }

    pub fn store(&self) -> &Arc<dyn BookStore> {
        &self.store
    }

    /// Add a book. Duplicates are allowed.
    pub async fn add_book(&self, payload: BookPayload) -> Result<BookId, BookError> {
        let book = payload.validate()?;
        let id = self.store.insert(book).await?;
        tracing::info!(book_id = %id, "book added");
        Ok(id)
    }

    pub async fn list_books(&self) -> Result<Vec<Book>, BookError> {
        let books = self.store.find_all().await?;
        tracing::debug!(count = books.len(), "books listed");
        Ok(books)
    }

    /// Overwrite title, author and availability of an existing book.
    pub async fn update_book(&self, raw_id: &str, payload: BookPayload) -> Result<(), BookError> {
        let id = BookId::parse(raw_id)?;
        let book = payload.validate()?;

        let matched = self
            .store
            .update_by_id(id, BookChanges::replace(book))
            .await?;
        if matched == 0 {
            return Err(BookError::NotFound(id));
        }

        tracing::info!(book_id = %id, "book updated");
        Ok(())
    }

    pub async fn delete_book(&self, raw_id: &str) -> Result<(), BookError> {
        let id = BookId::parse(raw_id)?;

        if self.store.delete_by_id(id).await? == 0 {
            return Err(BookError::NotFound(id));
        }

        tracing::info!(book_id = %id, "book deleted");
        Ok(())
    }

    /// Move an available book to borrowed.
    pub async fn borrow_book(&self, raw_id: &str) -> Result<(), BookError> {
        self.transition(raw_id, Transition::Borrow).await
    }

    /// Move a borrowed book back to available.
    pub async fn return_book(&self, raw_id: &str) -> Result<(), BookError> {
        self.transition(raw_id, Transition::Return).await
    }

    async fn transition(&self, raw_id: &str, transition: Transition) -> Result<(), BookError> {
        let id = BookId::parse(raw_id)?;

        match self.borrow_mode {
            BorrowMode::Atomic => self.transition_atomic(id, transition).await?,
            BorrowMode::CheckThenAct => self.transition_check_then_act(id, transition).await?,
        }

        tracing::info!(
            book_id = %id,
            transition = transition.as_str(),
            mode = ?self.borrow_mode,
            "book state changed"
        );
        Ok(())
    }

    async fn transition_atomic(&self, id: BookId, transition: Transition) -> Result<(), BookError> {
        let matched = self
            .store
            .set_available_if(
                id,
                transition.source().is_available(),
                transition.target().is_available(),
            )
            .await?;
        if matched == 1 {
            return Ok(());
        }

        // Nothing matched: either the book is gone or the guard failed
        match self.store.find_by_id(id).await? {
            None => Err(BookError::NotFound(id)),
            Some(_) => Err(transition.guard_error(id)),
        }
    }

    /// Read, check, then write unconditionally. Two concurrent callers can
    /// both pass the check.
    async fn transition_check_then_act(
        &self,
        id: BookId,
        transition: Transition,
    ) -> Result<(), BookError> {
        let book = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(BookError::NotFound(id))?;
        if book.state() != transition.source() {
            return Err(transition.guard_error(id));
        }

        let changes = BookChanges::availability(transition.target().is_available());
        if self.store.update_by_id(id, changes).await? == 0 {
            return Err(BookError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::{
        models::NewBook,
        store::{MemoryBookStore, StoreResult},
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Barrier;

    fn payload(title: &str, author: &str) -> BookPayload {
        BookPayload {
            title: title.to_string(),
            author: author.to_string(),
            available: true,
        }
    }

    fn service(mode: BorrowMode) -> BookService {
        BookService::new(Arc::new(MemoryBookStore::new()), mode)
    }

    async fn for_each_mode<F, Fut>(check: F)
    where
        F: Fn(BookService) -> Fut,
        Fut: std::future::Future<Output = ()>,
    {
        check(service(BorrowMode::Atomic)).await;
        check(service(BorrowMode::CheckThenAct)).await;
    }

    #[tokio::test]
    async fn added_book_is_listed() {
        let svc = service(BorrowMode::Atomic);
        let id = svc.add_book(payload("T", "A")).await.unwrap();

        let books = svc.list_books().await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, id);
        assert_eq!(books[0].title, "T");
        assert_eq!(books[0].author, "A");
        assert!(books[0].available);
    }

    #[tokio::test]
    async fn duplicates_are_permitted() {
        let svc = service(BorrowMode::Atomic);
        let first = svc.add_book(payload("T", "A")).await.unwrap();
        let second = svc.add_book(payload("T", "A")).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(svc.list_books().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn blank_title_never_reaches_storage() {
        let svc = service(BorrowMode::Atomic);
        let err = svc.add_book(payload(" ", "A")).await.unwrap_err();
        assert!(matches!(err, BookError::Validation { .. }));
        assert!(svc.list_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_overwrites_every_field() {
        let svc = service(BorrowMode::Atomic);
        let id = svc
            .add_book(payload("Original Title", "Original Author"))
            .await
            .unwrap();

        let replacement = BookPayload {
            title: "Updated Title".to_string(),
            author: "Updated Author".to_string(),
            available: false,
        };
        svc.update_book(&id.to_string(), replacement).await.unwrap();

        let book = svc.store().find_by_id(id).await.unwrap().unwrap();
        assert_eq!(book.title, "Updated Title");
        assert_eq!(book.author, "Updated Author");
        assert!(!book.available);
    }

    #[tokio::test]
    async fn update_with_identical_values_succeeds() {
        let svc = service(BorrowMode::Atomic);
        let id = svc.add_book(payload("T", "A")).await.unwrap();
        svc.update_book(&id.to_string(), payload("T", "A")).await.unwrap();
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found_without_mutation() {
        let svc = service(BorrowMode::Atomic);
        let existing = svc.add_book(payload("T", "A")).await.unwrap();

        let err = svc
            .update_book("60af924e5c146f001c8d4e99", payload("Won't Update", "No Author"))
            .await
            .unwrap_err();
        assert!(matches!(err, BookError::NotFound(_)));

        let books = svc.list_books().await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, existing);
        assert_eq!(books[0].title, "T");
    }

    #[tokio::test]
    async fn delete_then_delete_again_is_not_found() {
        let svc = service(BorrowMode::Atomic);
        let id = svc.add_book(payload("To Be Deleted", "Author")).await.unwrap();

        svc.delete_book(&id.to_string()).await.unwrap();
        assert!(svc.store().find_by_id(id).await.unwrap().is_none());

        let err = svc.delete_book(&id.to_string()).await.unwrap_err();
        assert!(matches!(err, BookError::NotFound(found) if found == id));
    }

    #[tokio::test]
    async fn borrow_and_return_round_trip() {
        for_each_mode(|svc| async move {
            let id = svc.add_book(payload("Borrowable", "A")).await.unwrap();
            let raw = id.to_string();

            svc.borrow_book(&raw).await.unwrap();
            assert!(!svc.store().find_by_id(id).await.unwrap().unwrap().available);

            svc.return_book(&raw).await.unwrap();
            assert!(svc.store().find_by_id(id).await.unwrap().unwrap().available);
        })
        .await;
    }

    #[tokio::test]
    async fn second_borrow_is_not_available() {
        for_each_mode(|svc| async move {
            let id = svc.add_book(payload("Unavailable", "A")).await.unwrap();
            svc.borrow_book(&id.to_string()).await.unwrap();

            let err = svc.borrow_book(&id.to_string()).await.unwrap_err();
            assert!(matches!(err, BookError::NotAvailable(_)));
        })
        .await;
    }

    #[tokio::test]
    async fn return_without_borrow_is_not_borrowed() {
        for_each_mode(|svc| async move {
            let id = svc.add_book(payload("Not Borrowed", "A")).await.unwrap();

            let err = svc.return_book(&id.to_string()).await.unwrap_err();
            assert!(matches!(err, BookError::NotBorrowed(_)));
        })
        .await;
    }

    #[tokio::test]
    async fn book_created_unavailable_can_only_be_returned() {
        for_each_mode(|svc| async move {
            let mut body = payload("Shelved", "A");
            body.available = false;
            let id = svc.add_book(body).await.unwrap();

            let err = svc.borrow_book(&id.to_string()).await.unwrap_err();
            assert!(matches!(err, BookError::NotAvailable(_)));
            svc.return_book(&id.to_string()).await.unwrap();
        })
        .await;
    }

    #[tokio::test]
    async fn transitions_on_unknown_book_are_not_found() {
        for_each_mode(|svc| async move {
            let missing = BookId::generate().to_string();
            assert!(matches!(
                svc.borrow_book(&missing).await,
                Err(BookError::NotFound(_))
            ));
            assert!(matches!(
                svc.return_book(&missing).await,
                Err(BookError::NotFound(_))
            ));
        })
        .await;
    }

    #[tokio::test]
    async fn deleted_book_can_be_removed_from_either_state() {
        let svc = service(BorrowMode::Atomic);
        let id = svc.add_book(payload("Gone", "A")).await.unwrap();
        svc.borrow_book(&id.to_string()).await.unwrap();
        svc.delete_book(&id.to_string()).await.unwrap();

        let err = svc.return_book(&id.to_string()).await.unwrap_err();
        assert!(matches!(err, BookError::NotFound(_)));
    }

    /// Store wrapper that counts calls, used to prove malformed ids never
    /// reach storage.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryBookStore,
        calls: AtomicUsize,
    }

    impl CountingStore {
        fn touch(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl BookStore for CountingStore {
        async fn insert(&self, book: NewBook) -> StoreResult<BookId> {
            self.touch();
            self.inner.insert(book).await
        }

        async fn find_all(&self) -> StoreResult<Vec<Book>> {
            self.touch();
            self.inner.find_all().await
        }

        async fn find_by_id(&self, id: BookId) -> StoreResult<Option<Book>> {
            self.touch();
            self.inner.find_by_id(id).await
        }

        async fn update_by_id(&self, id: BookId, changes: BookChanges) -> StoreResult<u64> {
            self.touch();
            self.inner.update_by_id(id, changes).await
        }

        async fn delete_by_id(&self, id: BookId) -> StoreResult<u64> {
            self.touch();
            self.inner.delete_by_id(id).await
        }

        async fn set_available_if(
            &self,
            id: BookId,
            expected: bool,
            available: bool,
        ) -> StoreResult<u64> {
            self.touch();
            self.inner.set_available_if(id, expected, available).await
        }
    }

    #[tokio::test]
    async fn invalid_ids_fail_before_storage_access() {
        for mode in [BorrowMode::Atomic, BorrowMode::CheckThenAct] {
            let store = Arc::new(CountingStore::default());
            let svc = BookService::new(store.clone(), mode);

            for raw in ["invalid_id", "", "1234"] {
                let results = [
                    svc.update_book(raw, payload("T", "A")).await,
                    svc.delete_book(raw).await,
                    svc.borrow_book(raw).await,
                    svc.return_book(raw).await,
                ];
                for result in results {
                    assert!(matches!(result, Err(BookError::InvalidId(_))));
                }
            }
            assert_eq!(store.calls.load(Ordering::SeqCst), 0);
        }
    }

    /// Which store calls wait for each other before proceeding.
    #[derive(Clone, Copy)]
    enum Gate {
        Reads,
        ConditionalWrites,
    }

    /// Store wrapper that forces two concurrent callers to line up at the
    /// gated call, so both observe the same record state.
    struct RaceStore {
        inner: MemoryBookStore,
        barrier: Barrier,
        gate: Gate,
    }

    impl RaceStore {
        fn new(gate: Gate) -> Self {
            Self {
                inner: MemoryBookStore::new(),
                barrier: Barrier::new(2),
                gate,
            }
        }
    }

    #[async_trait]
    impl BookStore for RaceStore {
        async fn insert(&self, book: NewBook) -> StoreResult<BookId> {
            self.inner.insert(book).await
        }

        async fn find_all(&self) -> StoreResult<Vec<Book>> {
            self.inner.find_all().await
        }

        async fn find_by_id(&self, id: BookId) -> StoreResult<Option<Book>> {
            let found = self.inner.find_by_id(id).await;
            if matches!(self.gate, Gate::Reads) {
                self.barrier.wait().await;
            }
            found
        }

        async fn update_by_id(&self, id: BookId, changes: BookChanges) -> StoreResult<u64> {
            self.inner.update_by_id(id, changes).await
        }

        async fn delete_by_id(&self, id: BookId) -> StoreResult<u64> {
            self.inner.delete_by_id(id).await
        }

        async fn set_available_if(
            &self,
            id: BookId,
            expected: bool,
            available: bool,
        ) -> StoreResult<u64> {
            if matches!(self.gate, Gate::ConditionalWrites) {
                self.barrier.wait().await;
            }
            self.inner.set_available_if(id, expected, available).await
        }
    }

    #[tokio::test]
    async fn check_then_act_lets_concurrent_borrows_both_succeed() {
        let svc = BookService::new(
            Arc::new(RaceStore::new(Gate::Reads)),
            BorrowMode::CheckThenAct,
        );
        let raw = svc.add_book(payload("Contested", "A")).await.unwrap().to_string();

        let (first, second) = tokio::join!(svc.borrow_book(&raw), svc.borrow_book(&raw));

        assert!(first.is_ok());
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn atomic_mode_reports_lost_borrow_race() {
        let svc = BookService::new(
            Arc::new(RaceStore::new(Gate::ConditionalWrites)),
            BorrowMode::Atomic,
        );
        let raw = svc.add_book(payload("Contested", "A")).await.unwrap().to_string();

        let (first, second) = tokio::join!(svc.borrow_book(&raw), svc.borrow_book(&raw));

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(BookError::NotAvailable(_)))));
    }
}
