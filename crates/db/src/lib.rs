//! MongoDB client factory for the shelf document store.

use std::time::Duration;

use anyhow::Context;
use mongodb::{bson::doc, options::ClientOptions, Client, Database};
use shelf_kernel::settings::DatabaseSettings;

const APP_NAME: &str = "shelf";

/// Connect to MongoDB, select the configured database and verify it answers.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Database> {
    let mut options = ClientOptions::parse(&settings.uri)
        .await
        .with_context(|| "failed to parse MongoDB connection string")?;
    options.app_name = Some(APP_NAME.to_string());
    options.server_selection_timeout = Some(Duration::from_millis(settings.connect_timeout_ms));

    let client = Client::with_options(options).context("failed to build MongoDB client")?;
    let database = client.database(&settings.name);

    ping(&database)
        .await
        .with_context(|| format!("MongoDB database '{}' is unreachable", settings.name))?;

    tracing::info!(
        target: "shelf-db",
        database = %settings.name,
        "connected to MongoDB"
    );
    Ok(database)
}

/// Round-trip a `ping` command against the database.
pub async fn ping(database: &Database) -> anyhow::Result<()> {
    database
        .run_command(doc! { "ping": 1 })
        .await
        .context("ping command failed")?;
    Ok(())
}
