#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Index document ingestion for filever
//!
//! An index is a PowerShell CLIXML export describing one indexing pass: a
//! root object whose members carry run metadata (`algorithm`, `root`,
//! timestamps, counts) and an `items` list of per-file dictionaries
//! (`ok`, `path`, `length`, `hash`, `error`).
//!
//! Parsing is all-or-nothing. Unknown members and unknown record keys are
//! tolerated, but any value that cannot be decoded fails the whole document.

mod document;
mod text;
mod value;

use std::path::Path;

use filever_errors::{Error, IndexError, StorageError};
use filever_events::{AppEvent, EventEmitter, EventSender, FailureContext, IndexEvent};
use filever_types::{IndexedFileItem, RunInfo};
use tracing::{debug, info};

/// A parsed index: run summary plus records in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    pub run: RunInfo,
    pub items: Vec<IndexedFileItem>,
}

impl Index {
    /// Number of records the indexer failed on
    #[must_use]
    pub fn errored_items(&self) -> usize {
        self.items.iter().filter(|i| i.has_error()).count()
    }
}

/// Parse raw index document bytes.
///
/// # Errors
/// Returns an [`IndexError`] if the bytes are not valid UTF-8/UTF-16 text,
/// not well-formed CLIXML, contain no root object, or hold a record value
/// that cannot be decoded.
pub fn parse_index(bytes: &[u8]) -> Result<Index, IndexError> {
    let text = text::decode_document(bytes)?;
    let index = document::parse_text(&text)?;
    debug!(
        algorithm = %index.run.algorithm,
        items = index.items.len(),
        total_bytes = index.run.total_bytes,
        "parsed index document"
    );
    Ok(index)
}

/// Read and parse an index file.
///
/// # Errors
/// Returns a storage error if the file cannot be read, or an index error if
/// it cannot be parsed.
pub async fn load_index(path: impl AsRef<Path>) -> Result<Index, Error> {
    IndexLoader::new().load(path).await
}

/// Loads index files and reports progress over the event channel.
#[derive(Debug, Clone, Default)]
pub struct IndexLoader {
    tx: Option<EventSender>,
}

impl EventEmitter for IndexLoader {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl IndexLoader {
    #[must_use]
    pub fn new() -> Self {
        Self { tx: None }
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Read and parse an index file, emitting load events.
    ///
    /// # Errors
    /// See [`load_index`].
    pub async fn load(&self, path: impl AsRef<Path>) -> Result<Index, Error> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        self.emit(AppEvent::Index(IndexEvent::LoadStarted {
            path: shown.clone(),
        }));

        match read_and_parse(path).await {
            Ok(index) => {
                info!(
                    path = %shown,
                    algorithm = %index.run.algorithm,
                    items = index.items.len(),
                    "index loaded"
                );
                self.emit(AppEvent::Index(IndexEvent::Loaded {
                    path: shown,
                    algorithm: index.run.algorithm.clone(),
                    items: index.items.len(),
                    errored_items: index.errored_items(),
                    total_bytes: index.run.total_bytes,
                }));
                Ok(index)
            }
            Err(err) => {
                self.emit(AppEvent::Index(IndexEvent::LoadFailed {
                    path: shown,
                    failure: FailureContext::from_error(&err),
                }));
                Err(err)
            }
        }
    }
}

async fn read_and_parse(path: &Path) -> Result<Index, Error> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| StorageError::from_io_with_path(&e, path))?;
    Ok(parse_index(&bytes)?)
}

#[cfg(test)]
mod tests;
