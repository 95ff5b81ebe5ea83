//! HTTP adapter - Axum routers, handlers and DTOs.

pub mod cleanup;
mod error;
pub mod events;
pub mod klaviyo;

pub use error::ApiError;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::application::{CleanupService, EventIngestionService};
use crate::ports::KlaviyoGateway;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub ingestion: Arc<EventIngestionService>,
    pub cleanup: Arc<CleanupService>,
    pub klaviyo: Arc<dyn KlaviyoGateway>,
}

/// Builds the complete application router.
///
/// # Routes
/// - `/events` - event ingestion and local queries
/// - `/klaviyo` - remote diagnostics
/// - `/cleanup` - retention management
/// - `GET /health` - liveness probe
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .nest("/events", events::routes())
        .nest("/klaviyo", klaviyo::routes())
        .nest("/cleanup", cleanup::routes())
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
