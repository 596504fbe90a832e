//! # Application Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     FLEETRENT_DB_PATH=/var/lib/fleetrent/fleet.db                       │
//! │     FLEETRENT_INDICATOR_URL=http://localhost:9000/api                   │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     ~/.config/fleetrent/fleetrent.toml (Linux)                          │
//! │     ~/Library/Application Support/cl.fleetrent.fleetrent/... (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/var/lib/fleetrent/fleet.db"
//! max_connections = 5
//!
//! [indicator]
//! base_url = "https://mindicador.cl/api"
//! code = "uf"
//! timeout_secs = 10
//!
//! [settlement]
//! currency = "CLP"
//! minor_units = 0
//!
//! [logging]
//! level = "info"
//! ```
//!
//! The four-hour cancellation window is a business rule and is not read
//! from here.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use fleetrent_core::RentalPricingEngine;
use fleetrent_db::DbConfig;
use fleetrent_indicator::IndicatorConfig;

/// Highest scale a decimal can carry.
const MAX_MINOR_UNITS: u32 = 28;

// =============================================================================
// Config Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error(transparent)]
    Indicator(#[from] fleetrent_indicator::ConfigError),

    #[error("No config path available")]
    NoConfigPath,
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to `fleetrent.db` in the platform data dir.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

/// Currency that rental totals are charged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementConfig {
    /// ISO 4217 code, used for display only.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Fractional digits kept when rounding totals. CLP has none.
    #[serde(default)]
    pub minor_units: u32,
}

fn default_currency() -> String {
    "CLP".to_string()
}

impl Default for SettlementConfig {
    fn default() -> Self {
        SettlementConfig {
            currency: default_currency(),
            minor_units: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `fleetrent_rental=debug`.
    /// `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub indicator: IndicatorConfig,

    #[serde(default)]
    pub settlement: SettlementConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    // =========================================================================
    // Loading / Saving
    // =========================================================================

    /// Loads configuration from file, then applies environment overrides.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.indicator.validate()?;

        if self.database.max_connections == 0 {
            return Err(ConfigError::invalid(
                "database.max_connections",
                "must be greater than 0",
            ));
        }

        let currency = &self.settlement.currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::invalid(
                "settlement.currency",
                format!("expected a three-letter ISO code, got '{currency}'"),
            ));
        }

        if self.settlement.minor_units > MAX_MINOR_UNITS {
            return Err(ConfigError::invalid(
                "settlement.minor_units",
                format!("must be at most {MAX_MINOR_UNITS}"),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies `FLEETRENT_*` overrides looked up through `lookup`.
    /// Values that do not parse are ignored with a warning.
    pub fn apply_env_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("FLEETRENT_DB_PATH") {
            debug!(%path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(url) = lookup("FLEETRENT_INDICATOR_URL") {
            debug!(%url, "Overriding indicator URL from environment");
            self.indicator.base_url = url;
        }

        if let Some(code) = lookup("FLEETRENT_INDICATOR_CODE") {
            self.indicator.code = code;
        }

        if let Some(secs) = lookup("FLEETRENT_INDICATOR_TIMEOUT_SECS") {
            match secs.parse() {
                Ok(parsed) => self.indicator.timeout_secs = parsed,
                Err(_) => warn!(value = %secs, "Ignoring FLEETRENT_INDICATOR_TIMEOUT_SECS"),
            }
        }

        if let Some(days) = lookup("FLEETRENT_LOOKBACK_DAYS") {
            match days.parse() {
                Ok(parsed) => self.indicator.max_lookback_days = parsed,
                Err(_) => warn!(value = %days, "Ignoring FLEETRENT_LOOKBACK_DAYS"),
            }
        }

        if let Some(enabled) = lookup("FLEETRENT_CACHE_ENABLED") {
            match enabled.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.indicator.cache_enabled = true,
                "0" | "false" | "no" => self.indicator.cache_enabled = false,
                _ => warn!(value = %enabled, "Ignoring FLEETRENT_CACHE_ENABLED"),
            }
        }

        if let Some(currency) = lookup("FLEETRENT_CURRENCY") {
            self.settlement.currency = currency.to_uppercase();
        }

        if let Some(units) = lookup("FLEETRENT_MINOR_UNITS") {
            match units.parse() {
                Ok(parsed) => self.settlement.minor_units = parsed,
                Err(_) => warn!(value = %units, "Ignoring FLEETRENT_MINOR_UNITS"),
            }
        }

        if let Some(level) = lookup("FLEETRENT_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Platform config file location.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("cl", "fleetrent", "fleetrent")
            .map(|dirs| dirs.config_dir().join("fleetrent.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Database file, falling back to the platform data dir.
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .or_else(|| {
                directories::ProjectDirs::from("cl", "fleetrent", "fleetrent")
                    .map(|dirs| dirs.data_dir().join("fleetrent.db"))
            })
            .unwrap_or_else(|| PathBuf::from("fleetrent.db"))
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path()).max_connections(self.database.max_connections)
    }

    pub fn pricing_engine(&self) -> RentalPricingEngine {
        RentalPricingEngine::new(self.settlement.minor_units)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.settlement.currency, "CLP");
        assert_eq!(config.settlement.minor_units, 0);
        assert_eq!(config.indicator.code, "uf");
        assert_eq!(config.indicator.max_lookback_days, 7);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [settlement]
            currency = "USD"
            minor_units = 2

            [indicator]
            base_url = "http://localhost:9000/api"
            "#,
        )
        .unwrap();

        assert_eq!(config.settlement.currency, "USD");
        assert_eq!(config.pricing_engine().minor_units(), 2);
        assert_eq!(config.indicator.base_url, "http://localhost:9000/api");
        assert_eq!(config.indicator.code, "uf");
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_env_overrides_from(env(&[
            ("FLEETRENT_DB_PATH", "/tmp/fleet.db"),
            ("FLEETRENT_INDICATOR_URL", "http://127.0.0.1:8080"),
            ("FLEETRENT_LOOKBACK_DAYS", "3"),
            ("FLEETRENT_CACHE_ENABLED", "false"),
            ("FLEETRENT_CURRENCY", "usd"),
            ("FLEETRENT_MINOR_UNITS", "2"),
        ]));

        assert_eq!(config.database_path(), PathBuf::from("/tmp/fleet.db"));
        assert_eq!(config.indicator.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.indicator.max_lookback_days, 3);
        assert!(!config.indicator.cache_enabled);
        assert_eq!(config.settlement.currency, "USD");
        assert_eq!(config.settlement.minor_units, 2);
    }

    #[test]
    fn test_unparseable_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_env_overrides_from(env(&[
            ("FLEETRENT_INDICATOR_TIMEOUT_SECS", "soon"),
            ("FLEETRENT_CACHE_ENABLED", "maybe"),
        ]));
        assert_eq!(config.indicator.timeout_secs, 10);
        assert!(config.indicator.cache_enabled);
    }

    #[test]
    fn test_validate_rejects_bad_settlement() {
        let mut config = AppConfig::default();
        config.settlement.currency = "pesos".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let mut config = AppConfig::default();
        config.settlement.minor_units = 29;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_delegates_indicator_section() {
        let mut config = AppConfig::default();
        config.indicator.max_lookback_days = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Indicator(_))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = std::env::temp_dir().join(format!("fleetrent-config-{}", std::process::id()));
        let path = dir.join("fleetrent.toml");

        let mut config = AppConfig::default();
        config.database.path = Some(PathBuf::from("/data/fleet.db"));
        config.settlement.minor_units = 2;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded: AppConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
