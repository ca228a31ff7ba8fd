use async_trait::async_trait;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    Collection, Database,
};
use serde::{Deserialize, Serialize};

use super::{BookStore, StoreError, StoreResult};
use crate::modules::books::{
    id::BookId,
    models::{Book, BookChanges, NewBook},
};

/// On-disk shape of a book in the MongoDB collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BookDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    title: String,
    author: String,
    available: bool,
}

impl From<NewBook> for BookDocument {
    fn from(book: NewBook) -> Self {
        Self {
            id: None,
            title: book.title,
            author: book.author,
            available: book.available,
        }
    }
}

impl TryFrom<BookDocument> for Book {
    type Error = StoreError;

    fn try_from(document: BookDocument) -> Result<Self, Self::Error> {
        let id = document
            .id
            .ok_or_else(|| StoreError::Malformed("book document without _id".to_string()))?;
        Ok(Book {
            id: BookId::from(id),
            title: document.title,
            author: document.author,
            available: document.available,
        })
    }
}

fn id_filter(id: BookId) -> Document {
    doc! { "_id": id.as_object_id() }
}

fn set_document(changes: BookChanges) -> Document {
    let mut set = Document::new();
    if let Some(title) = changes.title {
        set.insert("title", title);
    }
    if let Some(author) = changes.author {
        set.insert("author", author);
    }
    if let Some(available) = changes.available {
        set.insert("available", available);
    }
    doc! { "$set": set }
}

/// Book store backed by a MongoDB collection.
#[derive(Debug, Clone)]
pub struct MongoBookStore {
    collection: Collection<BookDocument>,
}

impl MongoBookStore {
    pub fn new(database: &Database, collection: &str) -> Self {
        Self {
            collection: database.collection(collection),
        }
    }
}

#[async_trait]
impl BookStore for MongoBookStore {
    async fn insert(&self, book: NewBook) -> StoreResult<BookId> {
        let result = self.collection.insert_one(BookDocument::from(book)).await?;
        result
            .inserted_id
            .as_object_id()
            .map(BookId::from)
            .ok_or_else(|| StoreError::Malformed("inserted _id is not an ObjectId".to_string()))
    }

    async fn find_all(&self) -> StoreResult<Vec<Book>> {
        let mut cursor = self.collection.find(doc! {}).await?;
        let mut books = Vec::new();
        while cursor.advance().await? {
            books.push(Book::try_from(cursor.deserialize_current()?)?);
        }
        Ok(books)
    }

    async fn find_by_id(&self, id: BookId) -> StoreResult<Option<Book>> {
        self.collection
            .find_one(id_filter(id))
            .await?
            .map(Book::try_from)
            .transpose()
    }

    async fn update_by_id(&self, id: BookId, changes: BookChanges) -> StoreResult<u64> {
        // `$set` with no fields is rejected by the server
        if changes.is_empty() {
            return Ok(self.collection.count_documents(id_filter(id)).await?);
        }
        let result = self
            .collection
            .update_one(id_filter(id), set_document(changes))
            .await?;
        Ok(result.matched_count)
    }

    async fn delete_by_id(&self, id: BookId) -> StoreResult<u64> {
        let result = self.collection.delete_one(id_filter(id)).await?;
        Ok(result.deleted_count)
    }

    async fn set_available_if(
        &self,
        id: BookId,
        expected: bool,
        available: bool,
    ) -> StoreResult<u64> {
        let filter = doc! { "_id": id.as_object_id(), "available": expected };
        let result = self
            .collection
            .update_one(filter, set_document(BookChanges::availability(available)))
            .await?;
        Ok(result.matched_count)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.collection
            .client()
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_documents_let_storage_assign_the_id() {
        let document = BookDocument::from(NewBook {
            title: "T".to_string(),
            author: "A".to_string(),
            available: true,
        });
        let bson = mongodb::bson::to_document(&document).unwrap();
        assert!(!bson.contains_key("_id"));
        assert!(bson.get_bool("available").unwrap());
    }

    #[test]
    fn documents_without_id_are_malformed() {
        let document = BookDocument {
            id: None,
            title: "T".to_string(),
            author: "A".to_string(),
            available: false,
        };
        assert!(matches!(Book::try_from(document), Err(StoreError::Malformed(_))));
    }

    #[test]
    fn set_document_only_contains_changed_fields() {
        let update = set_document(BookChanges::availability(false));
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.len(), 1);
        assert!(!set.get_bool("available").unwrap());
    }

    #[test]
    fn full_replace_sets_every_field() {
        let update = set_document(BookChanges::replace(NewBook {
            title: "Updated Title".to_string(),
            author: "Updated Author".to_string(),
            available: false,
        }));
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("title").unwrap(), "Updated Title");
        assert_eq!(set.get_str("author").unwrap(), "Updated Author");
        assert_eq!(set.len(), 3);
    }
}
