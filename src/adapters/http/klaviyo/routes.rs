//! Axum router for Klaviyo diagnostic endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    get_remote_events, get_remote_metrics, get_remote_profile, sync_test, test_connection,
};
use crate::adapters::http::AppState;

/// Klaviyo diagnostic routes.
///
/// - `GET /test-connection` - connectivity probe
/// - `GET /metrics` - raw remote metric listing
/// - `GET /profiles/:email` - remote profile lookup
/// - `GET /events` - remote event listing
/// - `POST /sync-test` - end-to-end sync check
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/test-connection", get(test_connection))
        .route("/metrics", get(get_remote_metrics))
        .route("/profiles/:email", get(get_remote_profile))
        .route("/events", get(get_remote_events))
        .route("/sync-test", post(sync_test))
}
