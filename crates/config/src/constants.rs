//! Built-in defaults and well-known names

/// Directory under the platform config/data dirs
pub const APP_DIR: &str = "filever";
pub const CONFIG_FILE: &str = "config.toml";
pub const LOGS_DIR: &str = "logs";

pub const DEFAULT_WORKERS: usize = 2;
pub const DEFAULT_REPORT_PATH: &str = "mismatches.txt";
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 1000;

pub const DEFAULT_SPLITS: usize = 8;
pub const DEFAULT_ALGORITHM: &str = "SHA256";
