//! HTTP handlers for the book catalog.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use shelf_http::{error::AppError, extract::ValidJson};

use super::{
    models::{Book, BookPayload, BorrowRequest, CreatedResponse, MessageResponse},
    service::BookService,
};

/// Build the catalog router with the service as shared state.
pub fn router(service: BookService) -> Router {
    Router::new()
        .route("/books/", post(add_book).get(list_books))
        .route("/books/{id}", put(update_book).delete(delete_book))
        .route("/borrow/", post(borrow_book))
        .route("/return/", post(return_book))
        .route("/health", get(health_check))
        .with_state(service)
}

async fn add_book(
    State(service): State<BookService>,
    ValidJson(payload): ValidJson<BookPayload>,
) -> Result<Json<CreatedResponse>, AppError> {
    let id = service.add_book(payload).await?;
    Ok(Json(CreatedResponse {
        message: "Book added",
        id,
    }))
}

async fn list_books(State(service): State<BookService>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(service.list_books().await?))
}

async fn update_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<BookPayload>,
) -> Result<Json<MessageResponse>, AppError> {
    service.update_book(&id, payload).await?;
    Ok(Json(MessageResponse {
        message: "Book updated",
    }))
}

async fn delete_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    service.delete_book(&id).await?;
    Ok(Json(MessageResponse {
        message: "Book deleted",
    }))
}

async fn borrow_book(
    State(service): State<BookService>,
    ValidJson(request): ValidJson<BorrowRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    service.borrow_book(&request.book_id).await?;
    Ok(Json(MessageResponse {
        message: "Book borrowed",
    }))
}

async fn return_book(
    State(service): State<BookService>,
    ValidJson(request): ValidJson<BorrowRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    service.return_book(&request.book_id).await?;
    Ok(Json(MessageResponse {
        message: "Book returned",
    }))
}

/// Reports whether the book store answers
async fn health_check(State(service): State<BookService>) -> (StatusCode, &'static str) {
    match service.store().ping().await {
        Ok(()) => (StatusCode::OK, "books module is healthy"),
        Err(err) => {
            tracing::warn!(error = %err, "book store ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, "book store is unreachable")
        }
    }
}
