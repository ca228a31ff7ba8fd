use serde_json::json;
use shelf_http::error::AppError;
use thiserror::Error;

use super::{id::BookId, store::StoreError};

/// Failures of the book catalog operations.
#[derive(Debug, Error)]
pub enum BookError {
    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<serde_json::Value>,
    },

    #[error("Invalid book ID")]
    InvalidId(String),

    #[error("Book not found")]
    NotFound(BookId),

    #[error("Book not available")]
    NotAvailable(BookId),

    #[error("Book is not borrowed")]
    NotBorrowed(BookId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BookError {
    /// Validation failure for a single field.
    pub fn invalid_field(field: &str, error: &str) -> Self {
        Self::Validation {
            message: format!("{field}: {error}"),
            details: vec![json!({ "field": field, "error": error })],
        }
    }
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        let detail = err.to_string();
        match err {
            BookError::Validation { details, .. } => AppError::validation(details, detail),
            BookError::InvalidId(_) => AppError::bad_request(detail).with_code("invalid_id"),
            BookError::NotFound(_) => AppError::not_found(detail),
            BookError::NotAvailable(_) => AppError::bad_request(detail).with_code("not_available"),
            BookError::NotBorrowed(_) => AppError::bad_request(detail).with_code("not_borrowed"),
            BookError::Store(source) => AppError::Internal(anyhow::Error::new(source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn maps_to_http_statuses() {
        let id = BookId::generate();
        let cases = [
            (
                BookError::invalid_field("title", "must not be empty"),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (BookError::InvalidId("nope".into()), StatusCode::BAD_REQUEST),
            (BookError::NotFound(id), StatusCode::NOT_FOUND),
            (BookError::NotAvailable(id), StatusCode::BAD_REQUEST),
            (BookError::NotBorrowed(id), StatusCode::BAD_REQUEST),
            (
                BookError::Store(StoreError::Poisoned),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn detail_messages_match_the_public_contract() {
        let id = BookId::generate();
        assert_eq!(BookError::InvalidId("x".into()).to_string(), "Invalid book ID");
        assert_eq!(BookError::NotFound(id).to_string(), "Book not found");
        assert_eq!(BookError::NotAvailable(id).to_string(), "Book not available");
        assert_eq!(BookError::NotBorrowed(id).to_string(), "Book is not borrowed");
    }
}
