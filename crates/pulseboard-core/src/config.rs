//! Configuration management for pulseboard
//!
//! A [`Config`] is built once at startup and handed by reference to every view that
//! needs it. Nothing reads configuration from ambient globals after that point.

use crate::types::GeoPoint;
use crate::utils::PROXIMITY_THRESHOLD_DEGREES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend selection and transport settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Polling schedule
    #[serde(default)]
    pub polling: PollingConfig,

    /// Derived metric parameters
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Map viewport settings
    #[serde(default)]
    pub map: MapConfig,

    /// Proximity matching settings
    #[serde(default)]
    pub proximity: ProximityConfig,

    /// Local settings snapshot
    #[serde(default)]
    pub settings: SettingsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where dashboard data comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    /// A REST backend at `base_url`
    Live,
    /// The bundled fixture set
    #[default]
    Fixture,
}

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Live backend or fixture data
    #[serde(default)]
    pub mode: DataMode,

    /// Base URL of the REST backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent as `X-API-Key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

/// Polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Seconds between poll cycles
    #[serde(default = "default_poll_interval")]
    pub interval_seconds: u64,

    /// Seconds to wait for the timer task on deactivation
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

/// Derived metric parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Lowest health score reported
    #[serde(default = "default_health_floor")]
    pub health_floor: u32,

    /// Health score with no unresolved alerts
    #[serde(default = "default_health_ceiling")]
    pub health_ceiling: u32,

    /// Points deducted per unresolved alert
    #[serde(default = "default_alert_penalty")]
    pub alert_penalty: u32,

    /// Stock percentage at or below which a store is low
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: f64,

    /// Fuel percentage at or below which a truck is low
    #[serde(default = "default_low_fuel_threshold")]
    pub low_fuel_threshold: f64,
}

/// Map viewport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Zoom used when recentering on a selected entity
    #[serde(default = "default_focus_zoom")]
    pub focus_zoom: u8,

    /// Initial map center
    #[serde(default = "default_center")]
    pub default_center: GeoPoint,

    /// Initial zoom
    #[serde(default = "default_zoom")]
    pub default_zoom: u8,
}

/// Proximity matching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProximityConfig {
    /// Degree delta under which entities count as related
    #[serde(default = "default_proximity_threshold")]
    pub threshold_degrees: f64,
}

/// Local settings snapshot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// JSON file holding the snapshot
    #[serde(default = "default_snapshot_file", skip_serializing_if = "Option::is_none")]
    pub snapshot_file: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

const fn default_request_timeout() -> u64 {
    15
}

const fn default_poll_interval() -> u64 {
    30
}

const fn default_shutdown_timeout() -> u64 {
    5
}

const fn default_health_floor() -> u32 {
    60
}

const fn default_health_ceiling() -> u32 {
    100
}

const fn default_alert_penalty() -> u32 {
    3
}

const fn default_low_stock_threshold() -> f64 {
    20.0
}

const fn default_low_fuel_threshold() -> f64 {
    20.0
}

const fn default_focus_zoom() -> u8 {
    12
}

const fn default_center() -> GeoPoint {
    GeoPoint::new(39.8283, -98.5795)
}

const fn default_zoom() -> u8 {
    4
}

const fn default_proximity_threshold() -> f64 {
    PROXIMITY_THRESHOLD_DEGREES
}

fn default_snapshot_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "pulseboard", "pulseboard")
        .map(|dirs| dirs.data_dir().join("settings.json"))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: DataMode::default(),
            base_url: default_base_url(),
            api_key: None,
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_poll_interval(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            health_floor: default_health_floor(),
            health_ceiling: default_health_ceiling(),
            alert_penalty: default_alert_penalty(),
            low_stock_threshold: default_low_stock_threshold(),
            low_fuel_threshold: default_low_fuel_threshold(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            focus_zoom: default_focus_zoom(),
            default_center: default_center(),
            default_zoom: default_zoom(),
        }
    }
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            threshold_degrees: default_proximity_threshold(),
        }
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            snapshot_file: default_snapshot_file(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl BackendConfig {
    /// Request timeout as a [`Duration`]
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl PollingConfig {
    /// Poll interval as a [`Duration`]
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    /// Shutdown timeout as a [`Duration`]
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }
}

impl Config {
    /// Load configuration from an optional `pulseboard` file and the environment
    ///
    /// Environment variables use the `PULSEBOARD_` prefix with `__` between nested
    /// keys, e.g. `PULSEBOARD_BACKEND__MODE=live`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed.
    pub fn load() -> crate::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("pulseboard").required(false))
            .add_source(
                config::Environment::with_prefix("PULSEBOARD")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Load configuration from an explicit TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_toml_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration.
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::configuration(e.to_string()))
    }

    /// Render the configuration as TOML
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::configuration(e.to_string()))
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Validation`] naming the first offending field.
    pub fn validate(&self) -> crate::Result<()> {
        if self.backend.mode == DataMode::Live && self.backend.base_url.trim().is_empty() {
            return Err(crate::Error::validation(
                "backend.base_url",
                "must be set when mode is live",
            ));
        }
        if self.backend.request_timeout_seconds == 0 {
            return Err(crate::Error::validation(
                "backend.request_timeout_seconds",
                "must be greater than zero",
            ));
        }
        if self.polling.interval_seconds == 0 {
            return Err(crate::Error::validation(
                "polling.interval_seconds",
                "must be greater than zero",
            ));
        }
        if self.metrics.health_floor > self.metrics.health_ceiling {
            return Err(crate::Error::validation(
                "metrics.health_floor",
                "must not exceed metrics.health_ceiling",
            ));
        }
        if self.proximity.threshold_degrees < 0.0 {
            return Err(crate::Error::validation(
                "proximity.threshold_degrees",
                "must not be negative",
            ));
        }
        Ok(())
    }
}
