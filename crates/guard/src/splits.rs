//! Window-by-window comparison of suspected duplicate files

use std::path::{Path, PathBuf};
use std::time::Instant;

use filever_errors::{ConfigError, Error, StorageError};
use filever_events::{AppEvent, CompareEvent, EventEmitter, EventSender, FailureContext};
use filever_hash::{digest_file, ByteRange, HashAlgorithm};
use filever_types::{SplitComparisonResult, SplitWindow};
use futures::future::try_join_all;
use tracing::{debug, info};
use uuid::Uuid;

use crate::verifier::resolve_algorithm;

/// Largest split count a comparison accepts
pub const MAX_SPLITS: usize = 1 << 16;

/// Tile `[0, min_size)` with exactly `splits` contiguous windows.
///
/// Every window gets `min_size / splits` bytes and the first
/// `min_size % splits` windows one extra byte. A zero `splits` yields no
/// windows.
#[must_use]
pub fn split_windows(min_size: u64, splits: usize) -> Vec<SplitWindow> {
    let Ok(count) = u64::try_from(splits) else {
        return Vec::new();
    };
    if count == 0 {
        return Vec::new();
    }

    let base = min_size / count;
    let extra = min_size % count;

    let mut windows = Vec::with_capacity(splits.min(MAX_SPLITS));
    let mut start = 0u64;
    for (index, i) in (0..count).enumerate() {
        let len = base + u64::from(i < extra);
        windows.push(SplitWindow { index, start, len });
        start += len;
    }
    windows
}

/// Compares two or more files over their common prefix.
#[derive(Debug, Clone, Default)]
pub struct SplitComparator {
    tx: Option<EventSender>,
}

impl EventEmitter for SplitComparator {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl SplitComparator {
    #[must_use]
    pub fn new() -> Self {
        Self { tx: None }
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Digest every window of every file and report where they disagree.
    ///
    /// The first path is the reference; a window differs when any other
    /// file's digest for it differs from the first file's. Length
    /// differences beyond the shortest file are reported as tail bytes only.
    ///
    /// # Errors
    /// Returns a config error for fewer than two paths, a split count outside
    /// `1..=MAX_SPLITS` or a missing/unsupported algorithm, and a storage
    /// error if any file cannot be statted or read. No partial result is returned.
    pub async fn compare(
        &self,
        paths: &[PathBuf],
        splits: usize,
        algorithm: &str,
    ) -> Result<SplitComparisonResult, Error> {
        let operation_id = Uuid::new_v4().to_string();
        let outcome = self.run(&operation_id, paths, splits, algorithm).await;
        if let Err(err) = &outcome {
            self.emit(AppEvent::Compare(CompareEvent::Failed {
                operation_id,
                failure: FailureContext::from_error(err),
            }));
        }
        outcome
    }

    async fn run(
        &self,
        operation_id: &str,
        paths: &[PathBuf],
        splits: usize,
        algorithm: &str,
    ) -> Result<SplitComparisonResult, Error> {
        let algorithm = validate(paths, splits, algorithm)?;
        let started = Instant::now();

        self.emit(AppEvent::Compare(CompareEvent::Started {
            operation_id: operation_id.to_string(),
            files: paths.len(),
            splits,
            algorithm: algorithm.as_str().to_string(),
        }));

        let sizes = stat_sizes(paths).await?;
        let min_size = sizes.iter().copied().min().unwrap_or(0);
        let max_size = sizes.iter().copied().max().unwrap_or(0);
        let windows = split_windows(min_size, splits);

        let mut split_hashes = Vec::with_capacity(windows.len());
        let mut differing_splits = Vec::new();

        for window in &windows {
            let range = ByteRange::new(window.start, window.len);
            let hashes = try_join_all(
                paths
                    .iter()
                    .map(|path| digest_file(path, algorithm, Some(range), None)),
            )
            .await?;

            let reference = &hashes[0];
            if hashes.iter().skip(1).any(|h| h != reference) {
                debug!(window = window.index, start = window.start, len = window.len, "window differs");
                self.emit(AppEvent::Compare(CompareEvent::WindowDiffers {
                    operation_id: operation_id.to_string(),
                    window: window.index,
                    start: window.start,
                    len: window.len,
                }));
                differing_splits.push(window.index);
            }
            split_hashes.push(hashes);
        }

        let tail_bytes = sizes.iter().map(|size| size - min_size).collect();
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            files = paths.len(),
            splits,
            differing = differing_splits.len(),
            min_size,
            max_size,
            "split comparison completed"
        );
        self.emit(AppEvent::Compare(CompareEvent::Completed {
            operation_id: operation_id.to_string(),
            differing: differing_splits.len(),
            min_size,
            max_size,
            duration_ms,
        }));

        Ok(SplitComparisonResult {
            algorithm: algorithm.as_str().to_string(),
            split_count: splits,
            paths: paths.to_vec(),
            sizes,
            min_size,
            max_size,
            windows,
            split_hashes,
            differing_splits,
            tail_bytes,
        })
    }
}

/// Compare files window by window without event reporting.
///
/// # Errors
/// See [`SplitComparator::compare`].
pub async fn compare_splits(
    paths: &[PathBuf],
    splits: usize,
    algorithm: &str,
) -> Result<SplitComparisonResult, Error> {
    SplitComparator::new().compare(paths, splits, algorithm).await
}

fn validate(paths: &[PathBuf], splits: usize, algorithm: &str) -> Result<HashAlgorithm, ConfigError> {
    if paths.len() < 2 {
        return Err(ConfigError::TooFewPaths { given: paths.len() });
    }
    if splits == 0 || splits > MAX_SPLITS {
        return Err(ConfigError::InvalidSplitCount {
            splits,
            max: MAX_SPLITS,
        });
    }
    resolve_algorithm(algorithm)
}

async fn stat_sizes(paths: &[PathBuf]) -> Result<Vec<u64>, Error> {
    let mut sizes = Vec::with_capacity(paths.len());
    for path in paths {
        sizes.push(file_size(path).await?);
    }
    Ok(sizes)
}

async fn file_size(path: &Path) -> Result<u64, Error> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| StorageError::from_io_with_path(&e, path))?;
    if !meta.is_file() {
        return Err(StorageError::IoError {
            message: format!("{}: not a regular file", path.display()),
        }
        .into());
    }
    Ok(meta.len())
}
