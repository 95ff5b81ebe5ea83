//! Handlers for event ingestion and local queries.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use super::dto::{
    CountQuery, CountResponse, CreateBulkEventsRequest, CreateEventRequest, EmailsQuery,
    EmailsResponse, EventResponse, MetricsResponse, ProfileAttributesResponse,
    ProfileMetricsResponse,
};
use crate::adapters::http::{ApiError, AppState};
use crate::domain::foundation::Attributes;

/// `POST /events` - record one event.
pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    let input = request.into_new_event()?;
    let event = state.ingestion.create_event(input).await?;
    Ok((StatusCode::CREATED, Json(event.into())))
}

/// `POST /events/bulk` - record many events in order.
pub async fn create_bulk_events(
    State(state): State<AppState>,
    Json(request): Json<CreateBulkEventsRequest>,
) -> Result<(StatusCode, Json<Vec<EventResponse>>), ApiError> {
    let inputs = request
        .events
        .into_iter()
        .map(CreateEventRequest::into_new_event)
        .collect::<Result<Vec<_>, _>>()?;

    let events = state.ingestion.create_bulk_events(inputs).await?;
    Ok((
        StatusCode::CREATED,
        Json(events.into_iter().map(Into::into).collect()),
    ))
}

/// `GET /events/metrics` - distinct metric names, remote-preferred.
pub async fn get_all_metrics(
    State(state): State<AppState>,
) -> Result<Json<MetricsResponse>, ApiError> {
    let metrics = state.ingestion.get_all_metrics().await?;
    Ok(Json(MetricsResponse { metrics }))
}

/// `GET /events/count?date=..&metric=..` - local count for a day and metric.
pub async fn get_events_count(
    State(state): State<AppState>,
    Query(query): Query<CountQuery>,
) -> Result<Json<CountResponse>, ApiError> {
    let count = state
        .ingestion
        .get_events_count_by_metric(query.date, &query.metric)
        .await?;

    Ok(Json(CountResponse {
        metric: query.metric,
        date: query.date,
        count,
    }))
}

/// `GET /events/emails?date=..[&metric=..]` - distinct emails for a day.
pub async fn get_emails(
    State(state): State<AppState>,
    Query(query): Query<EmailsQuery>,
) -> Result<Json<EmailsResponse>, ApiError> {
    let emails = state
        .ingestion
        .get_emails_by_date_and_metric(query.date, query.metric.as_deref())
        .await?;

    Ok(Json(EmailsResponse { emails }))
}

/// `GET /events/profiles/:email/attributes` - profile lookup, remote-preferred.
///
/// A profile that exists nowhere yields an empty attribute map rather than a
/// 404, so callers can treat the response shape as uniform.
pub async fn get_profile_attributes(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<ProfileAttributesResponse>, ApiError> {
    let profile = state.ingestion.get_profile_attributes(&email).await?;

    Ok(Json(ProfileAttributesResponse {
        email,
        attributes: profile.map(|p| p.attributes).unwrap_or_else(Attributes::new),
    }))
}

/// `GET /events/profiles/:email/metrics` - distinct local event names.
pub async fn get_profile_metrics(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<ProfileMetricsResponse>, ApiError> {
    let metrics = state.ingestion.get_profile_metrics(&email).await?;
    Ok(Json(ProfileMetricsResponse { email, metrics }))
}
