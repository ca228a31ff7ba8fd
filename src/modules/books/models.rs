use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{error::BookError, id::BookId};

/// A book record as persisted in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    /// Identifier assigned by storage on creation
    pub id: BookId,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Whether the book can currently be borrowed
    pub available: bool,
}

impl Book {
    pub fn state(&self) -> BookState {
        BookState::from_available(self.available)
    }
}

/// Borrow state of a single book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookState {
    Available,
    Borrowed,
}

impl BookState {
    pub fn from_available(available: bool) -> Self {
        if available {
            Self::Available
        } else {
            Self::Borrowed
        }
    }

    pub fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Guarded transitions between [`BookState`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Borrow,
    Return,
}

impl Transition {
    /// State the book must be in for the transition to apply
    pub fn source(self) -> BookState {
        match self {
            Self::Borrow => BookState::Available,
            Self::Return => BookState::Borrowed,
        }
    }

    pub fn target(self) -> BookState {
        match self {
            Self::Borrow => BookState::Borrowed,
            Self::Return => BookState::Available,
        }
    }

    /// Error reported when the book is not in [`Transition::source`]
    pub fn guard_error(self, id: BookId) -> BookError {
        match self {
            Self::Borrow => BookError::NotAvailable(id),
            Self::Return => BookError::NotBorrowed(id),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Borrow => "borrow",
            Self::Return => "return",
        }
    }
}

/// A validated book record that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub available: bool,
}

impl NewBook {
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            available: self.available,
        }
    }
}

/// `$set`-style patch applied by the store; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub available: Option<bool>,
}

impl BookChanges {
    /// Overwrite every field with the given record.
    pub fn replace(book: NewBook) -> Self {
        Self {
            title: Some(book.title),
            author: Some(book.author),
            available: Some(book.available),
        }
    }

    pub fn availability(available: bool) -> Self {
        Self {
            available: Some(available),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.available.is_none()
    }

    pub fn apply_to(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(author) = self.author {
            book.author = author;
        }
        if let Some(available) = self.available {
            book.available = available;
        }
    }
}

fn default_available() -> bool {
    true
}

/// Request body for creating or replacing a book.
#[derive(Debug, Clone, Deserialize)]
pub struct BookPayload {
    pub title: String,
    pub author: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

impl BookPayload {
    /// Check the payload and turn it into a storable record.
    pub fn validate(self) -> Result<NewBook, BookError> {
        let mut details = Vec::new();
        for (field, value) in [("title", &self.title), ("author", &self.author)] {
            if value.trim().is_empty() {
                details.push(json!({ "field": field, "error": "must not be empty" }));
            }
        }

        if !details.is_empty() {
            return Err(BookError::Validation {
                message: "title and author must not be empty".to_string(),
                details,
            });
        }

        Ok(NewBook {
            title: self.title,
            author: self.author,
            available: self.available,
        })
    }
}

/// Request body for the borrow and return endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct BorrowRequest {
    pub book_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse {
    pub message: &'static str,
    pub id: BookId,
}
