//! Axum router for cleanup endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{cleanup_stats, manual_cleanup};
use crate::adapters::http::AppState;

/// Retention cleanup routes.
///
/// - `POST /manual` - run cleanup now
/// - `GET /stats` - preview without deleting
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/manual", post(manual_cleanup))
        .route("/stats", get(cleanup_stats))
}
