//! Klaviyo API configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Klaviyo API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct KlaviyoConfig {
    /// Private API key. When absent the service still runs, but every
    /// outbound Klaviyo call reports the integration as unconfigured.
    pub api_key: Option<String>,

    /// Base URL for the Klaviyo API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl KlaviyoConfig {
    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check whether an API key is present
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Validate Klaviyo configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidKlaviyoBaseUrl);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for KlaviyoConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://a.klaviyo.com/api".to_string()
}

fn default_timeout() -> u64 {
    30
}
