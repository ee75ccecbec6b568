use serde::{Deserialize, Serialize};

/// Non-OK classification of a single indexed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    /// The indexer recorded an error; the file was not checked
    Skipped,
    StatError,
    SizeMismatch,
    HashError,
    HashMismatch,
}

impl FlagKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::StatError => "stat_error",
            Self::SizeMismatch => "size_mismatch",
            Self::HashError => "hash_error",
            Self::HashMismatch => "hash_mismatch",
        }
    }
}

/// Events for one verification pass over an index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VerifyEvent {
    Started {
        operation_id: String,
        algorithm: String,
        items: usize,
        total_bytes: u64,
        workers: usize,
    },

    /// A file did not verify cleanly.
    ItemFlagged {
        operation_id: String,
        path: String,
        kind: FlagKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },

    Completed {
        operation_id: String,
        processed: u64,
        ok: u64,
        flagged: u64,
        mismatches: usize,
        bytes_hashed: u64,
        duration_ms: u64,
    },

    /// The pass could not start (bad configuration).
    Failed {
        operation_id: String,
        failure: super::FailureContext,
    },
}
