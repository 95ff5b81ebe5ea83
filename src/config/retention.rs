//! Data retention configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Retention cleanup configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// Number of days of event history to keep
    #[serde(default = "default_retention_days")]
    pub data_retention_days: u32,

    /// UTC hour at which the daily cleanup runs
    #[serde(default = "default_cleanup_hour")]
    pub cleanup_hour_utc: u32,
}

impl RetentionConfig {
    /// Validate retention configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.data_retention_days == 0 {
            return Err(ValidationError::InvalidRetentionWindow);
        }
        if self.cleanup_hour_utc > 23 {
            return Err(ValidationError::InvalidCleanupHour);
        }
        Ok(())
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            data_retention_days: default_retention_days(),
            cleanup_hour_utc: default_cleanup_hour(),
        }
    }
}

fn default_retention_days() -> u32 {
    7
}

fn default_cleanup_hour() -> u32 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_defaults() {
        let config = RetentionConfig::default();
        assert_eq!(config.data_retention_days, 7);
        assert_eq!(config.cleanup_hour_utc, 2);
    }

    #[test]
    fn test_validation_zero_retention() {
        let config = RetentionConfig {
            data_retention_days: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_hour() {
        let config = RetentionConfig {
            cleanup_hour_utc: 24,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
