//! Configuration sections

use serde::{Deserialize, Serialize};
use filever_types::{ColorChoice, OutputFormat};
use std::path::PathBuf;

use crate::constants;

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
    /// Where `--debug` writes JSON log files
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: OutputFormat::Tty,
            color: ColorChoice::Auto,
            log_dir: None,
        }
    }
}

/// Settings for `filever verify`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    #[serde(default = "default_workers")]
    pub workers: usize, // 0 = auto-detect
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            workers: constants::DEFAULT_WORKERS,
            report_path: PathBuf::from(constants::DEFAULT_REPORT_PATH),
            progress_interval_ms: constants::DEFAULT_PROGRESS_INTERVAL_MS,
        }
    }
}

/// Settings for `filever splits`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    #[serde(default = "default_splits")]
    pub splits: usize,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            splits: constants::DEFAULT_SPLITS,
            algorithm: constants::DEFAULT_ALGORITHM.to_string(),
        }
    }
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Tty
}

fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_workers() -> usize {
    constants::DEFAULT_WORKERS
}

fn default_report_path() -> PathBuf {
    PathBuf::from(constants::DEFAULT_REPORT_PATH)
}

fn default_progress_interval_ms() -> u64 {
    constants::DEFAULT_PROGRESS_INTERVAL_MS
}

fn default_splits() -> usize {
    constants::DEFAULT_SPLITS
}

fn default_algorithm() -> String {
    constants::DEFAULT_ALGORITHM.to_string()
}
