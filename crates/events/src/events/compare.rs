use serde::{Deserialize, Serialize};

/// Split comparison events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompareEvent {
    Started {
        operation_id: String,
        files: usize,
        splits: usize,
        algorithm: String,
    },

    /// At least one file disagrees with the first file inside this window.
    WindowDiffers {
        operation_id: String,
        window: usize,
        start: u64,
        len: u64,
    },

    Completed {
        operation_id: String,
        differing: usize,
        min_size: u64,
        max_size: u64,
        duration_ms: u64,
    },

    Failed {
        operation_id: String,
        failure: super::FailureContext,
    },
}
