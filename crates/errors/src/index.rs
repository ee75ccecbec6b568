//! Index document parse errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Failures while ingesting an index document. Any of these aborts the
/// whole load; no partial index is ever returned.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum IndexError {
    #[error("clixml: no top-level objects")]
    NoRootObject,

    #[error("clixml: malformed document: {message}")]
    MalformedDocument { message: String },

    #[error("clixml: invalid text encoding: {message}")]
    InvalidEncoding { message: String },

    #[error("clixml: entry decode error for {key:?}: {message}")]
    EntryDecode { key: String, message: String },
}

impl UserFacingError for IndexError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NoRootObject | Self::MalformedDocument { .. } => {
                Some("Regenerate the index with Export-Clixml and retry.")
            }
            Self::InvalidEncoding { .. } => Some("Save the index as UTF-8 or UTF-16 with a BOM."),
            Self::EntryDecode { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NoRootObject => "index.no_root_object",
            Self::MalformedDocument { .. } => "index.malformed_document",
            Self::InvalidEncoding { .. } => "index.invalid_encoding",
            Self::EntryDecode { .. } => "index.entry_decode",
        };
        Some(code)
    }
}
