pub mod books;

use std::sync::Arc;

use shelf_kernel::{settings::Settings, ModuleRegistry};

use books::{store::BookStore, BookService};

/// Register all project-specific modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    store: Arc<dyn BookStore>,
    settings: &Settings,
) {
    let service = BookService::new(store, settings.library.borrow_mode);
    registry.register(books::create_module(service));
}
