//! Handlers for Klaviyo remote diagnostics.
//!
//! These endpoints surface the raw remote view for operators; they bypass the
//! local store except for `sync_test`, which runs a complete ingestion round
//! trip with a fixed test event. Remote failures in the profile and event
//! lookups are reported inside a `success: false` body, not as error
//! statuses; only `/klaviyo/metrics` propagates them.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::json;

use super::dto::{
    ConnectionResponse, RemoteEventsQuery, RemoteEventsResponse, RemoteMetricsResponse,
    RemoteProfileResponse, SyncTestResponse,
};
use crate::adapters::http::{ApiError, AppState};
use crate::domain::event::NewEvent;
use crate::domain::foundation::Attributes;

/// `GET /klaviyo/test-connection` - connectivity probe, never fails.
pub async fn test_connection(State(state): State<AppState>) -> Json<ConnectionResponse> {
    let connected = state.klaviyo.test_connection().await;
    let message = if connected {
        "Klaviyo connection successful".to_string()
    } else {
        "Klaviyo connection failed".to_string()
    };

    Json(ConnectionResponse { connected, message })
}

/// `GET /klaviyo/metrics` - the raw remote metric listing. Unlike
/// `/events/metrics` this has no local fallback; remote failures propagate.
pub async fn get_remote_metrics(
    State(state): State<AppState>,
) -> Result<Json<RemoteMetricsResponse>, ApiError> {
    let metrics = state.klaviyo.list_metrics().await.map_err(ApiError::from)?;
    Ok(Json(RemoteMetricsResponse { metrics }))
}

/// `GET /klaviyo/profiles/:email` - remote profile lookup.
pub async fn get_remote_profile(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Json<RemoteProfileResponse> {
    let response = match state.klaviyo.fetch_profile(&email).await {
        Ok(Some(profile)) => RemoteProfileResponse::found(profile),
        Ok(None) => RemoteProfileResponse::not_found(&email),
        Err(err) => RemoteProfileResponse::failed(&err),
    };

    Json(response)
}

/// `GET /klaviyo/events` - remote event listing with optional filters.
pub async fn get_remote_events(
    State(state): State<AppState>,
    Query(query): Query<RemoteEventsQuery>,
) -> Json<RemoteEventsResponse> {
    let result = state
        .klaviyo
        .list_events(query.profile_id.as_deref(), query.metric_id.as_deref())
        .await;

    let response = match result {
        Ok(events) => RemoteEventsResponse::listed(events),
        Err(err) => RemoteEventsResponse::failed(&err),
    };

    Json(response)
}

/// `POST /klaviyo/sync-test` - end-to-end sync check.
///
/// Runs a fixed test event through the normal ingestion path and reports the
/// recorded sync outcome. Store failures still propagate; a sync failure is
/// reported as `success: false` in the body.
pub async fn sync_test(State(state): State<AppState>) -> Result<Json<SyncTestResponse>, ApiError> {
    let input = NewEvent {
        event_name: "Test Event".to_string(),
        event_attributes: [("source".to_string(), json!("sync-test"))]
            .into_iter()
            .collect(),
        profile_attributes: Some(
            [
                ("firstName".to_string(), json!("Test")),
                ("lastName".to_string(), json!("User")),
            ]
            .into_iter()
            .collect::<Attributes>(),
        ),
        email: Some("test@example.com".to_string()),
    };

    let event = state.ingestion.create_event(input).await?;

    let message = if event.sent_to_klaviyo {
        "Test event synced to Klaviyo".to_string()
    } else {
        "Test event stored locally but sync failed".to_string()
    };

    Ok(Json(SyncTestResponse {
        success: event.sent_to_klaviyo,
        message,
        sent_to_klaviyo: Some(event.sent_to_klaviyo),
        klaviyo_response: event.klaviyo_response,
    }))
}
