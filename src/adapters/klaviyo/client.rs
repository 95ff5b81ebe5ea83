//! Klaviyo HTTP client - implementation of the KlaviyoGateway port.
//!
//! Talks to the Klaviyo JSON:API. Requests carry the private API key in the
//! `Authorization` header and a pinned `revision` header. Profile attribute
//! names are translated to Klaviyo's snake_case fields on the way out;
//! attributes Klaviyo does not accept as top-level profile fields are dropped
//! with a warning.

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::KlaviyoConfig;
use crate::domain::foundation::Attributes;
use crate::ports::{EventSubmission, KlaviyoError, KlaviyoGateway, RemoteProfile};

/// Klaviyo API revision header value.
const KLAVIYO_REVISION: &str = "2024-10-15";

/// camelCase attribute names mapped to Klaviyo's snake_case profile fields.
static FIELD_RENAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("firstName", "first_name"),
        ("lastName", "last_name"),
        ("phoneNumber", "phone_number"),
    ])
});

/// Attributes Klaviyo rejects as top-level profile fields.
static UNSUPPORTED_FIELDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from(["age", "gender", "birthDate"]));

/// Configuration for the Klaviyo HTTP client.
#[derive(Debug, Clone)]
pub struct KlaviyoClientConfig {
    /// API key for authentication. Absent means the integration is disabled.
    api_key: Option<Secret<String>>,
    /// Base URL for the API (default: https://a.klaviyo.com/api).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl KlaviyoClientConfig {
    /// Creates a configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(Secret::new(api_key.into())),
            base_url: "https://a.klaviyo.com/api".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Creates a configuration without an API key. Every call except
    /// `test_connection` will fail with `NotConfigured`.
    pub fn unconfigured() -> Self {
        Self {
            api_key: None,
            base_url: "https://a.klaviyo.com/api".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> Result<&str, KlaviyoError> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret().as_str())
            .filter(|k| !k.is_empty())
            .ok_or(KlaviyoError::NotConfigured)
    }
}

impl From<&KlaviyoConfig> for KlaviyoClientConfig {
    fn from(config: &KlaviyoConfig) -> Self {
        Self {
            api_key: config
                .api_key
                .as_ref()
                .filter(|k| !k.is_empty())
                .map(|k| Secret::new(k.clone())),
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
        }
    }
}

/// Klaviyo API client implementation.
pub struct KlaviyoHttpClient {
    config: KlaviyoClientConfig,
    client: Client,
}

impl KlaviyoHttpClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: KlaviyoClientConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/", self.config.base_url, path)
    }

    async fn post(&self, path: &str, payload: &impl Serialize) -> Result<Value, KlaviyoError> {
        let api_key = self.config.api_key()?;

        let response = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Klaviyo-API-Key {}", api_key))
            .header("revision", KLAVIYO_REVISION)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| KlaviyoError::Transport(e.to_string()))?;

        Self::read_body(response).await
    }

    async fn get(&self, path: &str, filter: Option<&str>) -> Result<Value, KlaviyoError> {
        let api_key = self.config.api_key()?;

        let mut request = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Klaviyo-API-Key {}", api_key))
            .header("revision", KLAVIYO_REVISION);

        if let Some(filter) = filter {
            request = request.query(&[("filter", filter)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| KlaviyoError::Transport(e.to_string()))?;

        Self::read_body(response).await
    }

    async fn read_body(response: reqwest::Response) -> Result<Value, KlaviyoError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| KlaviyoError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(KlaviyoError::Api {
                status: status.as_u16(),
                body,
            });
        }

        // 202 Accepted responses to event submission have an empty body.
        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| KlaviyoError::Parse(e.to_string()))
    }
}

/// Translates profile attribute names to Klaviyo's field naming, dropping
/// attributes Klaviyo rejects as top-level profile fields.
fn translate_profile_attributes(attributes: &Attributes) -> Attributes {
    let mut translated = Attributes::new();
    for (key, value) in attributes.iter() {
        if UNSUPPORTED_FIELDS.contains(key.as_str()) {
            warn!(field = %key, "Dropping profile attribute unsupported by Klaviyo");
            continue;
        }
        let target = FIELD_RENAMES.get(key.as_str()).copied();
        translated.insert(target.unwrap_or(key.as_str()).to_string(), value.clone());
    }
    translated
}

/// Builds a JSON:API filter for the events listing. When both a profile and a
/// metric are given the clauses are AND-composed.
fn event_filter(profile_id: Option<&str>, metric_id: Option<&str>) -> Option<String> {
    let mut clauses = Vec::new();
    if let Some(id) = profile_id {
        clauses.push(format!("equals(profile.id,\"{}\")", id));
    }
    if let Some(id) = metric_id {
        clauses.push(format!("equals(metric.id,\"{}\")", id));
    }
    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(" and "))
    }
}

#[derive(Serialize)]
struct ApiPayload<T: Serialize> {
    data: ApiResource<T>,
}

#[derive(Serialize)]
struct ApiResource<T: Serialize> {
    #[serde(rename = "type")]
    kind: &'static str,
    attributes: T,
}

#[derive(Serialize)]
struct EventAttributes {
    properties: Value,
    time: String,
    metric: ApiPayload<MetricAttributes>,
    profile: ApiPayload<ProfileAttributes>,
}

#[derive(Serialize)]
struct MetricAttributes {
    name: String,
}

#[derive(Serialize)]
struct ProfileAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(flatten)]
    properties: Value,
}

fn event_payload(submission: &EventSubmission) -> ApiPayload<EventAttributes> {
    let profile_attributes = translate_profile_attributes(&submission.profile_attributes);

    ApiPayload {
        data: ApiResource {
            kind: "event",
            attributes: EventAttributes {
                properties: submission.event_attributes.clone().into_value(),
                time: Utc::now().to_rfc3339(),
                metric: ApiPayload {
                    data: ApiResource {
                        kind: "metric",
                        attributes: MetricAttributes {
                            name: submission.event_name.clone(),
                        },
                    },
                },
                profile: ApiPayload {
                    data: ApiResource {
                        kind: "profile",
                        attributes: ProfileAttributes {
                            email: submission.email.clone(),
                            properties: profile_attributes.into_value(),
                        },
                    },
                },
            },
        },
    }
}

fn profile_payload(email: &str, attributes: &Attributes) -> ApiPayload<ProfileAttributes> {
    ApiPayload {
        data: ApiResource {
            kind: "profile",
            attributes: ProfileAttributes {
                email: Some(email.to_string()),
                properties: attributes.clone().into_value(),
            },
        },
    }
}

#[async_trait]
impl KlaviyoGateway for KlaviyoHttpClient {
    async fn create_event(&self, submission: &EventSubmission) -> Result<Value, KlaviyoError> {
        debug!(event_name = %submission.event_name, "Submitting event to Klaviyo");
        self.post("events", &event_payload(submission)).await
    }

    async fn create_or_update_profile(
        &self,
        email: &str,
        attributes: &Attributes,
    ) -> Result<Value, KlaviyoError> {
        self.post("profiles", &profile_payload(email, attributes))
            .await
    }

    async fn list_metrics(&self) -> Result<Vec<String>, KlaviyoError> {
        let body = self.get("metrics", None).await?;

        let names = body
            .get("data")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        item.pointer("/attributes/name")
                            .and_then(Value::as_str)
                            .map(String::from)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(names)
    }

    async fn fetch_profile(&self, email: &str) -> Result<Option<RemoteProfile>, KlaviyoError> {
        let filter = format!("equals(email,\"{}\")", email);
        let body = self.get("profiles", Some(&filter)).await?;

        let profile = body
            .get("data")
            .and_then(Value::as_array)
            .and_then(|items| items.first())
            .and_then(|item| {
                let id = item.get("id")?.as_str()?.to_string();
                let attributes = item
                    .get("attributes")
                    .cloned()
                    .map(Attributes::from_value)
                    .unwrap_or_default();
                Some(RemoteProfile { id, attributes })
            });

        Ok(profile)
    }

    async fn list_events(
        &self,
        profile_id: Option<&str>,
        metric_id: Option<&str>,
    ) -> Result<Vec<Value>, KlaviyoError> {
        let filter = event_filter(profile_id, metric_id);
        let body = self.get("events", filter.as_deref()).await?;

        let events = body
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Ok(events)
    }

    async fn test_connection(&self) -> bool {
        match self.get("metrics", None).await {
            Ok(_) => true,
            Err(KlaviyoError::NotConfigured) => {
                warn!("Klaviyo connection test skipped: no API key configured");
                false
            }
            Err(e) => {
                warn!(error = %e, "Klaviyo connection test failed");
                false
            }
        }
    }
}
