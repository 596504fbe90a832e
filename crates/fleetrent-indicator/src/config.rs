//! # Indicator Configuration
//!
//! The `[indicator]` section of the application config.
//!
//! ```toml
//! [indicator]
//! base_url = "https://mindicador.cl/api"
//! code = "uf"
//! timeout_secs = 10
//! max_lookback_days = 7
//! cache_enabled = true
//! cache_capacity = 256
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fleetrent_core::MAX_LOOKBACK_DAYS;

/// Upper bound accepted for `max_lookback_days`.
pub const LOOKBACK_DAYS_LIMIT: u32 = 31;

// =============================================================================
// Config Error
// =============================================================================

/// Invalid indicator settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid indicator setting {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Indicator Config
// =============================================================================

/// Where and how to look up indicator values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    /// API root. Requests go to `{base_url}/{code}/{DD-MM-YYYY}`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Indicator code, e.g. `uf`.
    #[serde(default = "default_code")]
    pub code: String,

    /// Bounded wait for each lookup attempt.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of dates tried, starting with the requested one.
    #[serde(default = "default_max_lookback_days")]
    pub max_lookback_days: u32,

    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_base_url() -> String {
    "https://mindicador.cl/api".to_string()
}

fn default_code() -> String {
    "uf".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_lookback_days() -> u32 {
    MAX_LOOKBACK_DAYS
}

fn default_true() -> bool {
    true
}

fn default_cache_capacity() -> usize {
    256
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            code: default_code(),
            timeout_secs: default_timeout_secs(),
            max_lookback_days: default_max_lookback_days(),
            cache_enabled: default_true(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl IndicatorConfig {
    /// Per-attempt timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validates the section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::invalid(
                "base_url",
                format!("must start with http:// or https://, got: {}", self.base_url),
            ));
        }

        if self.code.trim().is_empty() {
            return Err(ConfigError::invalid("code", "must not be empty"));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid("timeout_secs", "must be greater than 0"));
        }

        if !(1..=LOOKBACK_DAYS_LIMIT).contains(&self.max_lookback_days) {
            return Err(ConfigError::invalid(
                "max_lookback_days",
                format!("must be between 1 and {}", LOOKBACK_DAYS_LIMIT),
            ));
        }

        if self.cache_enabled && self.cache_capacity == 0 {
            return Err(ConfigError::invalid(
                "cache_capacity",
                "must be greater than 0 when the cache is enabled",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = IndicatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.code, "uf");
        assert_eq!(config.max_lookback_days, 7);
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = IndicatorConfig::default();
        config.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = IndicatorConfig::default();
        config.max_lookback_days = 0;
        assert!(config.validate().is_err());
        config.max_lookback_days = 32;
        assert!(config.validate().is_err());
        config.max_lookback_days = 31;
        assert!(config.validate().is_ok());

        let mut config = IndicatorConfig::default();
        config.cache_capacity = 0;
        assert!(config.validate().is_err());
        config.cache_enabled = false;
        assert!(config.validate().is_ok());

        let mut config = IndicatorConfig::default();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: IndicatorConfig = serde_json::from_str(r#"{"code": "dolar"}"#).unwrap();
        assert_eq!(config.code, "dolar");
        assert_eq!(config.base_url, "https://mindicador.cl/api");
        assert!(config.cache_enabled);
    }
}
