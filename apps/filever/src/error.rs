//! CLI error handling

use std::fmt;

use filever_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration, index, verification or comparison error
    Ops(filever_errors::Error),
    /// Invalid command arguments
    InvalidArguments(String),
    /// The mismatch report could not be written
    Report {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    /// I/O error
    Io(std::io::Error),
}

impl CliError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArguments(_) => 2,
            CliError::Ops(e) if e.is_config() => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Ops(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Report { path, source } => {
                write!(f, "Failed to write report {}: {source}", path.display())
            }
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Ops(e) => Some(e),
            CliError::Report { source, .. } | CliError::Io(source) => Some(source),
            CliError::InvalidArguments(_) => None,
        }
    }
}

impl From<filever_errors::Error> for CliError {
    fn from(e: filever_errors::Error) -> Self {
        CliError::Ops(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
