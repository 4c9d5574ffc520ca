//! Generator tuning and configuration files.
//!
//! The default values are the inherited tuning of the reference kernel
//! generator. They trade rekey cost against the window of output exposed
//! by a state compromise, and should not be changed casually.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bytes served after which the next call reseeds.
pub const RESEED_BYTES: u64 = 65_536;

/// Seconds after a reseed at which the next call reseeds.
pub const RESEED_INTERVAL_SECS: u64 = 300;

/// Rekey countdown after a seed.
pub const REKEY_BYTES: u64 = 1_600_000;

/// Rekey countdown after the first stir, before any true reseed.
pub const INITIAL_REKEY_BYTES: u64 = 1024 * 1024 * 1024;

/// Tuning for the reseed and rekey policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Byte-volume reseed threshold.
    pub reseed_bytes: u64,
    /// Mandatory reseed interval in seconds.
    pub reseed_interval_secs: u64,
    /// Rekey countdown after a reseed.
    pub rekey_bytes: u64,
    /// Rekey countdown after the first stir.
    pub initial_rekey_bytes: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            reseed_bytes: RESEED_BYTES,
            reseed_interval_secs: RESEED_INTERVAL_SECS,
            rekey_bytes: REKEY_BYTES,
            initial_rekey_bytes: INITIAL_REKEY_BYTES,
        }
    }
}

impl GeneratorConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reseed_bytes == 0 {
            return Err(ConfigError::InvalidReseedBytes);
        }
        if self.reseed_interval_secs == 0 || self.reseed_interval_secs > i64::MAX as u64 {
            return Err(ConfigError::InvalidReseedInterval);
        }
        if self.rekey_bytes == 0 || self.initial_rekey_bytes == 0 {
            return Err(ConfigError::InvalidRekeyBytes);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// `reseed_bytes` was zero.
    #[error("reseed byte threshold must be non-zero")]
    InvalidReseedBytes,
    /// `reseed_interval_secs` was zero or does not fit an `i64`.
    #[error("reseed interval must be between 1 and i64::MAX seconds")]
    InvalidReseedInterval,
    /// A rekey countdown was zero.
    #[error("rekey countdowns must be non-zero")]
    InvalidRekeyBytes,
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The file is not valid TOML for this format.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Reseed and rekey tuning.
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Prometheus exporter settings.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Metrics exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Metrics server port (0 to disable).
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { port: 0 }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.generator.validate()?;
        Ok(config)
    }
}
