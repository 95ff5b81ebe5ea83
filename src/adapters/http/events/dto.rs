//! Request/response DTOs for the events endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Map;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::event::{Event, NewEvent};
use crate::domain::foundation::{Attributes, DomainError};

/// Body for `POST /events`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub event_name: String,
    #[serde(default)]
    pub event_attributes: Option<Map<String, Value>>,
    /// Presence matters: supplying an empty object updates an existing
    /// profile, omitting the field leaves it untouched.
    #[serde(default)]
    pub profile_attributes: Option<Map<String, Value>>,
    #[serde(default)]
    pub email: Option<String>,
}

impl CreateEventRequest {
    /// Validates the request and converts it to a domain input.
    pub fn into_new_event(self) -> Result<NewEvent, DomainError> {
        if self.event_name.trim().is_empty() {
            return Err(DomainError::validation("eventName", "must not be empty"));
        }
        if let Some(email) = &self.email {
            if !is_valid_email(email) {
                return Err(DomainError::validation("email", "must be a valid email"));
            }
        }

        Ok(NewEvent {
            event_name: self.event_name,
            event_attributes: self.event_attributes.map(Attributes::from).unwrap_or_default(),
            profile_attributes: self.profile_attributes.map(Attributes::from),
            email: self.email,
        })
    }
}

/// Syntactic email check: one `@` with a non-empty local part and a domain
/// carrying a dot-separated suffix, no whitespace.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    if email.contains(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((_, tld)) => !tld.is_empty() && !domain.starts_with('.') && !domain.ends_with('.'),
        None => false,
    }
}

/// Body for `POST /events/bulk`.
#[derive(Debug, Deserialize)]
pub struct CreateBulkEventsRequest {
    pub events: Vec<CreateEventRequest>,
}

/// A persisted event as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: Uuid,
    pub event_name: String,
    pub event_attributes: Attributes,
    pub profile_attributes: Attributes,
    pub email: Option<String>,
    pub profile_id: Option<Uuid>,
    pub event_date: NaiveDate,
    pub sent_to_klaviyo: bool,
    pub klaviyo_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            event_name: event.event_name,
            event_attributes: event.event_attributes,
            profile_attributes: event.profile_attributes,
            email: event.email,
            profile_id: event.profile_id,
            event_date: event.event_date,
            sent_to_klaviyo: event.sent_to_klaviyo,
            klaviyo_response: event.klaviyo_response,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

/// Query for `GET /events/count`.
#[derive(Debug, Deserialize)]
pub struct CountQuery {
    pub date: NaiveDate,
    pub metric: String,
}

/// Query for `GET /events/emails`.
#[derive(Debug, Deserialize)]
pub struct EmailsQuery {
    pub date: NaiveDate,
    #[serde(default)]
    pub metric: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub metrics: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub metric: String,
    pub date: NaiveDate,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct EmailsResponse {
    pub emails: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileAttributesResponse {
    pub email: String,
    pub attributes: Attributes,
}

#[derive(Debug, Serialize)]
pub struct ProfileMetricsResponse {
    pub email: String,
    pub metrics: Vec<String>,
}
