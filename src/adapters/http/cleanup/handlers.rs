//! Handlers for retention cleanup.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::adapters::http::{ApiError, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub deleted_events: u64,
    pub deleted_profiles: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupStatsResponse {
    pub total_events: u64,
    pub events_to_delete: u64,
    pub total_profiles: u64,
    pub orphaned_profiles: u64,
    pub retention_days: u32,
}

/// `POST /cleanup/manual` - run the full cleanup immediately.
pub async fn manual_cleanup(
    State(state): State<AppState>,
) -> Result<Json<CleanupResponse>, ApiError> {
    let outcome = state.cleanup.manual_cleanup().await?;

    Ok(Json(CleanupResponse {
        deleted_events: outcome.deleted_events,
        deleted_profiles: outcome.deleted_profiles,
    }))
}

/// `GET /cleanup/stats` - read-only preview of what cleanup would remove.
pub async fn cleanup_stats(
    State(state): State<AppState>,
) -> Result<Json<CleanupStatsResponse>, ApiError> {
    let stats = state.cleanup.get_cleanup_stats().await?;

    Ok(Json(CleanupStatsResponse {
        total_events: stats.total_events,
        events_to_delete: stats.events_to_delete,
        total_profiles: stats.total_profiles,
        orphaned_profiles: stats.orphaned_profiles,
        retention_days: stats.retention_days,
    }))
}
