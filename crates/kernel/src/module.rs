use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// Borrowed view of process state handed to lifecycle hooks.
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

/// A unit of application functionality with its own routes and lifecycle.
///
/// Hooks run in this order: `init`, then routes and OpenAPI are collected,
/// then `start`; `stop` runs once the server has drained.
#[async_trait]
pub trait Module: Sync + Send {
    /// Stable identifier, used in logs and lifecycle error context
    fn name(&self) -> &'static str;

    /// Path the module router is mounted under.
    ///
    /// Defaults to `/api/{name}`. An empty string merges the module
    /// routes into the server root.
    fn base_path(&self) -> String {
        format!("/api/{}", self.name())
    }

    /// Validate configuration before anything is served
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment with `paths` and `components.schemas` relative to
    /// [`Module::base_path`]
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Check backing services are reachable; a failure aborts startup
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
