pub mod error;
pub mod id;
pub mod models;
pub mod routes;
pub mod service;
pub mod store;

use async_trait::async_trait;
use axum::Router;
use serde_json::json;
use shelf_kernel::{InitCtx, Module};

pub use error::BookError;
pub use id::BookId;
pub use service::BookService;

/// Library book catalog: CRUD plus the borrow/return state machine.
pub struct BooksModule {
    service: BookService,
}

impl BooksModule {
    pub fn new(service: BookService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    /// Catalog routes live at the server root (`/books/`, `/borrow/`, ...)
    fn base_path(&self) -> String {
        String::new()
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            borrow_mode = ?self.service.borrow_mode(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.service.store().ping().await?;
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn json_body(schema: &str) -> serde_json::Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{schema}") }
            }
        }
    })
}

fn message_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/MessageResponse" }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let id_param = json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string" },
        "description": "24 character hex book identifier"
    });

    let books = json!({
        "get": {
            "summary": "List books",
            "tags": ["Books"],
            "responses": {
                "200": {
                    "description": "Every book in the catalog",
                    "content": {
                        "application/json": {
                            "schema": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Book" }
                            }
                        }
                    }
                }
            }
        },
        "post": {
            "summary": "Add a book",
            "tags": ["Books"],
            "requestBody": json_body("BookPayload"),
            "responses": {
                "200": {
                    "description": "Book added",
                    "content": {
                        "application/json": {
                            "schema": { "$ref": "#/components/schemas/CreatedResponse" }
                        }
                    }
                },
                "422": error_response("Missing or invalid fields")
            }
        }
    });

    let book = json!({
        "put": {
            "summary": "Replace a book",
            "tags": ["Books"],
            "parameters": [id_param.clone()],
            "requestBody": json_body("BookPayload"),
            "responses": {
                "200": message_response("Book updated"),
                "400": error_response("Invalid book ID"),
                "404": error_response("Book not found"),
                "422": error_response("Missing or invalid fields")
            }
        },
        "delete": {
            "summary": "Delete a book",
            "tags": ["Books"],
            "parameters": [id_param],
            "responses": {
                "200": message_response("Book deleted"),
                "400": error_response("Invalid book ID"),
                "404": error_response("Book not found")
            }
        }
    });

    let borrow = json!({
        "post": {
            "summary": "Borrow an available book",
            "tags": ["Circulation"],
            "requestBody": json_body("BorrowRequest"),
            "responses": {
                "200": message_response("Book borrowed"),
                "400": error_response("Invalid book ID or book not available"),
                "404": error_response("Book not found")
            }
        }
    });

    let give_back = json!({
        "post": {
            "summary": "Return a borrowed book",
            "tags": ["Circulation"],
            "requestBody": json_body("BorrowRequest"),
            "responses": {
                "200": message_response("Book returned"),
                "400": error_response("Invalid book ID or book is not borrowed"),
                "404": error_response("Book not found")
            }
        }
    });

    let text = json!({ "text/plain": { "schema": { "type": "string" } } });
    let health = json!({
        "get": {
            "summary": "Book store health check",
            "tags": ["Books"],
            "responses": {
                "200": { "description": "OK", "content": text.clone() },
                "503": { "description": "Book store unreachable", "content": text }
            }
        }
    });

    json!({
        "paths": {
            "/books/": books,
            "/books/{id}": book,
            "/borrow/": borrow,
            "/return/": give_back,
            "/health": health
        },
        "components": {
            "schemas": schemas()
        }
    })
}

fn schemas() -> serde_json::Value {
    json!({
        "Book": {
            "type": "object",
            "properties": {
                "id": { "type": "string", "description": "Identifier assigned by storage" },
                "title": { "type": "string" },
                "author": { "type": "string" },
                "available": { "type": "boolean" }
            },
            "required": ["id", "title", "author", "available"]
        },
        "BookPayload": {
            "type": "object",
            "properties": {
                "title": { "type": "string", "minLength": 1 },
                "author": { "type": "string", "minLength": 1 },
                "available": { "type": "boolean", "default": true }
            },
            "required": ["title", "author"]
        },
        "BorrowRequest": {
            "type": "object",
            "properties": {
                "book_id": { "type": "string" }
            },
            "required": ["book_id"]
        },
        "MessageResponse": {
            "type": "object",
            "properties": { "message": { "type": "string" } },
            "required": ["message"]
        },
        "CreatedResponse": {
            "type": "object",
            "properties": {
                "message": { "type": "string" },
                "id": { "type": "string" }
            },
            "required": ["message", "id"]
        }
    })
}

/// Create a new instance of the books module
pub fn create_module(service: BookService) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(service))
}
