//! Configuration error types
//!
//! Covers both the config file layer and run parameters that are rejected
//! before any file is touched (algorithm names, split counts, path lists).

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("parse error: {message}")]
    ParseError { message: String },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("unsupported algorithm: {algorithm:?}")]
    UnsupportedAlgorithm { algorithm: String },

    #[error("algorithm must be specified")]
    MissingAlgorithm,

    #[error("need at least 2 files, got {given}")]
    TooFewPaths { given: usize },

    #[error("splits must be between 1 and {max}, got {splits}")]
    InvalidSplitCount { splits: usize, max: usize },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => Some("Pass --config with an existing file or omit it."),
            Self::ParseError { .. } | Self::InvalidValue { .. } => {
                Some("Fix the configuration value and retry the command.")
            }
            Self::UnsupportedAlgorithm { .. } | Self::MissingAlgorithm => {
                Some("Use one of SHA256, SHA1, SHA512, SHA384 or MD5.")
            }
            Self::TooFewPaths { .. } => Some("Pass two or more files to compare."),
            Self::InvalidSplitCount { .. } => Some("Pass a split count of at least 1 and at most the allowed maximum."),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "config.not_found",
            Self::ParseError { .. } => "config.parse_error",
            Self::InvalidValue { .. } => "config.invalid_value",
            Self::UnsupportedAlgorithm { .. } => "config.unsupported_algorithm",
            Self::MissingAlgorithm => "config.missing_algorithm",
            Self::TooFewPaths { .. } => "config.too_few_paths",
            Self::InvalidSplitCount { .. } => "config.invalid_split_count",
        };
        Some(code)
    }
}
