use serde::{Deserialize, Serialize};

/// Index ingestion events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndexEvent {
    LoadStarted {
        path: String,
    },

    Loaded {
        path: String,
        algorithm: String,
        items: usize,
        errored_items: usize,
        total_bytes: u64,
    },

    LoadFailed {
        path: String,
        failure: super::FailureContext,
    },
}
