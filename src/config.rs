//! Configuration for the correlation engine.
//!
//! All tunable constants live in one value object with named fields; no
//! behavior hides in literals. Configurations load from YAML or JSON files
//! and can be assembled programmatically through a builder.
//!
//! # Configuration File Structure
//!
//! ```yaml
//! window_length_secs: 10.0
//! window_count: 10
//! transport_protocol: 6
//! vocabulary: directional
//! comm_range: 250.0
//! log_level: info
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::PROTOCOL_TCP;
use crate::logger::LogVocabulary;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

fn default_window_length() -> f64 {
    10.0
}

fn default_window_count() -> usize {
    10
}

fn default_transport_protocol() -> u8 {
    PROTOCOL_TCP
}

fn default_comm_range() -> f64 {
    250.0
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Tunable parameters of the correlation engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CorrelatorConfig {
    /// Length of one reporting window in simulated seconds
    #[serde(default = "default_window_length")]
    pub window_length_secs: f64,

    /// Number of reporting windows in a run
    #[serde(default = "default_window_count")]
    pub window_count: usize,

    /// Transport protocol of interest for header-based classification
    #[serde(default = "default_transport_protocol")]
    pub transport_protocol: u8,

    /// Label vocabulary for the transmission log
    #[serde(default)]
    pub vocabulary: LogVocabulary,

    /// Communication range in meters, consumed only by the proximity link
    /// source
    #[serde(default = "default_comm_range")]
    pub comm_range: f64,

    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for CorrelatorConfig {
    fn default() -> Self {
        Self {
            window_length_secs: default_window_length(),
            window_count: default_window_count(),
            transport_protocol: default_transport_protocol(),
            vocabulary: LogVocabulary::default(),
            comm_range: default_comm_range(),
            log_level: default_log_level(),
        }
    }
}

impl CorrelatorConfig {
    /// Creates a configuration with the documented defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: CorrelatorConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Loads configuration from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: CorrelatorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file, auto-detecting format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            _ => Err(ConfigError::UnknownFormat(ext.to_string())),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.window_count == 0 {
            return Err(ConfigError::Validation(
                "window_count must be at least 1".to_string(),
            ));
        }
        if !self.window_length_secs.is_finite() || self.window_length_secs <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "window_length_secs must be positive, got {}",
                self.window_length_secs
            )));
        }
        if !self.comm_range.is_finite() || self.comm_range <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "comm_range must be positive, got {}",
                self.comm_range
            )));
        }
        Ok(())
    }

    /// Converts to YAML string.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Converts to JSON string.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns the total simulated span covered by the reporting windows.
    pub fn covered_span_secs(&self) -> f64 {
        self.window_length_secs * self.window_count as f64
    }
}

/// Builder for creating a [`CorrelatorConfig`] programmatically.
#[derive(Default)]
pub struct CorrelatorConfigBuilder {
    config: CorrelatorConfig,
}

impl CorrelatorConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the window length in seconds.
    pub fn window_length_secs(mut self, length: f64) -> Self {
        self.config.window_length_secs = length;
        self
    }

    /// Sets the number of windows.
    pub fn window_count(mut self, count: usize) -> Self {
        self.config.window_count = count;
        self
    }

    /// Sets the transport protocol of interest.
    pub fn transport_protocol(mut self, protocol: u8) -> Self {
        self.config.transport_protocol = protocol;
        self
    }

    /// Sets the transmission-log vocabulary.
    pub fn vocabulary(mut self, vocabulary: LogVocabulary) -> Self {
        self.config.vocabulary = vocabulary;
        self
    }

    /// Sets the proximity communication range in meters.
    pub fn comm_range(mut self, range: f64) -> Self {
        self.config.comm_range = range;
        self
    }

    /// Sets the log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log_level = level.into();
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> ConfigResult<CorrelatorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
