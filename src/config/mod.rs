//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::calculate::DEFAULT_PYTHAGOREAN_EXPONENT;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Rating calculation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingsConfig {
    /// Exponent for the Pythagorean expectation
    #[serde(default = "default_pythagorean_exponent")]
    pub pythagorean_exponent: f64,
}

fn default_pythagorean_exponent() -> f64 {
    DEFAULT_PYTHAGOREAN_EXPONENT
}

impl Default for RatingsConfig {
    fn default() -> Self {
        Self {
            pythagorean_exponent: default_pythagorean_exponent(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub ratings: RatingsConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            ratings: RatingsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let exponent = self.ratings.pythagorean_exponent;
        if !exponent.is_finite() || exponent <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "Pythagorean exponent must be a positive number, got {}",
                exponent
            )));
        }

        Ok(())
    }
}
