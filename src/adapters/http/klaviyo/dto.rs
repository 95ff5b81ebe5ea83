//! DTOs for the Klaviyo diagnostic endpoints.
//!
//! Apart from `/klaviyo/metrics`, the diagnostic responses are `success`
//! envelopes: remote failures are reported inside the body with HTTP 200
//! rather than as error statuses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ports::{KlaviyoError, RemoteProfile};

#[derive(Debug, Serialize)]
pub struct ConnectionResponse {
    pub connected: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RemoteMetricsResponse {
    pub metrics: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProfileResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<RemoteProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RemoteProfileResponse {
    pub fn found(profile: RemoteProfile) -> Self {
        Self {
            success: true,
            profile: Some(profile),
            message: None,
            error: None,
        }
    }

    pub fn not_found(email: &str) -> Self {
        Self {
            success: false,
            profile: None,
            message: Some(format!("No Klaviyo profile found for {}", email)),
            error: None,
        }
    }

    pub fn failed(err: &KlaviyoError) -> Self {
        Self {
            success: false,
            profile: None,
            message: Some("Failed to fetch profile from Klaviyo".to_string()),
            error: Some(err.to_string()),
        }
    }
}

/// Query for `GET /klaviyo/events`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEventsQuery {
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(default)]
    pub metric_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEventsResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RemoteEventsResponse {
    pub fn listed(events: Vec<Value>) -> Self {
        Self {
            success: true,
            events: Some(events),
            message: None,
            error: None,
        }
    }

    pub fn failed(err: &KlaviyoError) -> Self {
        Self {
            success: false,
            events: None,
            message: Some("Failed to fetch events from Klaviyo".to_string()),
            error: Some(err.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTestResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_to_klaviyo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub klaviyo_response: Option<String>,
}
