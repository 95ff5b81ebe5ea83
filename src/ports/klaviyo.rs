//! KlaviyoGateway port - the remote marketing service client contract.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::foundation::Attributes;

/// Errors from the Klaviyo client, classified for the HTTP layer.
///
/// `NotConfigured` is a configuration error (missing API key) and maps to
/// service-unavailable; everything else is a transport or remote failure and
/// maps to bad-gateway. Best-effort sync paths catch all of these, record
/// them, and never propagate.
#[derive(Debug, Clone, Error)]
pub enum KlaviyoError {
    #[error("Klaviyo API key not configured")]
    NotConfigured,

    #[error("Klaviyo request failed: {0}")]
    Transport(String),

    #[error("Klaviyo API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse Klaviyo response: {0}")]
    Parse(String),
}

impl KlaviyoError {
    pub fn is_not_configured(&self) -> bool {
        matches!(self, KlaviyoError::NotConfigured)
    }
}

/// Event data submitted to Klaviyo. Field-name translation of profile
/// attributes happens inside the client, never against locally stored data.
#[derive(Debug, Clone, Serialize)]
pub struct EventSubmission {
    pub event_name: String,
    pub event_attributes: Attributes,
    pub profile_attributes: Attributes,
    pub email: Option<String>,
}

/// A profile as returned by the Klaviyo profiles listing.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteProfile {
    pub id: String,
    pub attributes: Attributes,
}

/// Client for the Klaviyo API.
///
/// Every operation except `test_connection` fails with
/// [`KlaviyoError::NotConfigured`] when no API key is set.
#[async_trait]
pub trait KlaviyoGateway: Send + Sync {
    /// Submits an event, returning the raw remote response body.
    async fn create_event(&self, submission: &EventSubmission) -> Result<Value, KlaviyoError>;

    /// Creates or updates a profile identified by email.
    async fn create_or_update_profile(
        &self,
        email: &str,
        attributes: &Attributes,
    ) -> Result<Value, KlaviyoError>;

    /// Metric names from the remote listing.
    async fn list_metrics(&self) -> Result<Vec<String>, KlaviyoError>;

    /// First remote profile exactly matching the email, if any.
    async fn fetch_profile(&self, email: &str) -> Result<Option<RemoteProfile>, KlaviyoError>;

    /// Remote events, optionally filtered by profile and/or metric id
    /// (AND-composed when both are given).
    async fn list_events(
        &self,
        profile_id: Option<&str>,
        metric_id: Option<&str>,
    ) -> Result<Vec<Value>, KlaviyoError>;

    /// Connectivity probe. Any failure, including a missing key, is reported
    /// as `false` and never raised.
    async fn test_connection(&self) -> bool;
}
