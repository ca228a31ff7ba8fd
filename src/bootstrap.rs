//! Process wiring: storage selection, module registration and serving.

use std::sync::Arc;

use anyhow::Context;
use shelf_kernel::{
    settings::{DatabaseSettings, Settings, StorageBackend},
    InitCtx, ModuleRegistry,
};

use crate::modules::{
    self,
    books::store::{BookStore, MemoryBookStore, MongoBookStore},
};

/// Build the book store selected by `database.backend`.
pub async fn build_store(settings: &DatabaseSettings) -> anyhow::Result<Arc<dyn BookStore>> {
    match settings.backend {
        StorageBackend::Memory => {
            tracing::warn!("using in-memory book store; data is lost on restart");
            Ok(Arc::new(MemoryBookStore::new()))
        }
        StorageBackend::Mongodb => {
            let database = shelf_db::connect(settings)
                .await
                .context("failed to connect book store")?;
            Ok(Arc::new(MongoBookStore::new(&database, &settings.collection)))
        }
    }
}

/// Registry with every application module registered against `store`.
pub fn build_registry(store: Arc<dyn BookStore>, settings: &Settings) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store, settings);
    registry
}

/// Run the application until a shutdown signal arrives.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let store = build_store(&settings.database).await?;
    let registry = build_registry(store, &settings);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = shelf_http::start_server(&registry, &settings).await;

    registry
        .stop_modules()
        .await
        .context("failed to stop modules cleanly")?;
    served
}
