//! Axum router for event endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    create_bulk_events, create_event, get_all_metrics, get_emails, get_events_count,
    get_profile_attributes, get_profile_metrics,
};
use crate::adapters::http::AppState;

/// Event ingestion and query routes.
///
/// - `POST /` - record one event
/// - `POST /bulk` - record many events in order
/// - `GET /metrics` - distinct metric names (remote-preferred)
/// - `GET /count` - count for a day and metric
/// - `GET /emails` - distinct emails for a day
/// - `GET /profiles/:email/attributes` - profile attributes (remote-preferred)
/// - `GET /profiles/:email/metrics` - distinct metric names for one email
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_event))
        .route("/bulk", post(create_bulk_events))
        .route("/metrics", get(get_all_metrics))
        .route("/count", get(get_events_count))
        .route("/emails", get(get_emails))
        .route("/profiles/:email/attributes", get(get_profile_attributes))
        .route("/profiles/:email/metrics", get(get_profile_metrics))
}
