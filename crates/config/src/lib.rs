#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for filever
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/filever/config.toml)
//! - Environment variables (`FILEVER_*`)
//! - CLI flags (applied by the binary)

pub mod constants;
pub mod sections;

pub use sections::{CompareConfig, GeneralConfig, VerifyConfig};

use filever_errors::{ConfigError, Error};
use filever_types::{ColorChoice, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub verify: VerifyConfig,

    #[serde(default)]
    pub compare: CompareConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir
            .join(constants::APP_DIR)
            .join(constants::CONFIG_FILE))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "loading config file");
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // FILEVER_OUTPUT
        if let Ok(output) = std::env::var("FILEVER_OUTPUT") {
            self.general.default_output = match output.as_str() {
                "plain" => OutputFormat::Plain,
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => return Err(invalid("FILEVER_OUTPUT", output)),
            };
        }

        // FILEVER_COLOR
        if let Ok(color) = std::env::var("FILEVER_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => return Err(invalid("FILEVER_COLOR", color)),
            };
        }

        if let Ok(workers) = std::env::var("FILEVER_WORKERS") {
            self.verify.workers = workers
                .parse()
                .map_err(|_| invalid("FILEVER_WORKERS", workers))?;
        }

        if let Ok(report) = std::env::var("FILEVER_REPORT") {
            if report.trim().is_empty() {
                return Err(invalid("FILEVER_REPORT", report));
            }
            self.verify.report_path = PathBuf::from(report);
        }

        if let Ok(splits) = std::env::var("FILEVER_SPLITS") {
            self.compare.splits = match splits.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(invalid("FILEVER_SPLITS", splits)),
            };
        }

        if let Ok(algorithm) = std::env::var("FILEVER_ALGORITHM") {
            if algorithm.trim().is_empty() {
                return Err(invalid("FILEVER_ALGORITHM", algorithm));
            }
            self.compare.algorithm = algorithm;
        }

        Ok(())
    }

    /// Reject values that parse but make no sense
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending key.
    pub fn validate(&self) -> Result<(), Error> {
        if self.compare.splits == 0 {
            return Err(invalid("compare.splits", "0".to_string()));
        }
        if self.compare.algorithm.trim().is_empty() {
            return Err(invalid("compare.algorithm", self.compare.algorithm.clone()));
        }
        if self.verify.progress_interval_ms == 0 {
            return Err(invalid("verify.progress_interval_ms", "0".to_string()));
        }
        Ok(())
    }

    /// Directory for debug log files (with default)
    #[must_use]
    pub fn log_dir(&self) -> PathBuf {
        self.general.log_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(constants::APP_DIR)
                .join(constants::LOGS_DIR)
        })
    }
}

fn invalid(field: &str, value: String) -> Error {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value,
    }
    .into()
}

/// Resolve the verification worker count
#[must_use]
pub fn resolve_workers(config_value: usize) -> usize {
    if config_value > 0 {
        config_value // User override
    } else {
        // Auto-detect: 75% of CPUs, minimum 1
        let cpus = num_cpus::get();
        (cpus * 3 / 4).max(1)
    }
}
