//! Concurrent re-verification of indexed files against the filesystem

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use filever_errors::{ConfigError, Error};
use filever_events::{AppEvent, EventEmitter, EventSender, FailureContext, FlagKind, VerifyEvent};
use filever_hash::{digests_match, hash_file, HashAlgorithm};
use filever_types::{IndexedFileItem, Mismatch};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::stats::{Outcome, VerificationStats};

/// Receives byte-count advancement from the hashing hot path.
///
/// Implementations must return quickly; rendering belongs on another task.
pub trait ProgressSink: Send + Sync {
    fn advance(&self, bytes: u64);
}

/// Final output of a verification pass
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct VerificationResult {
    pub operation_id: String,
    /// Hash mismatches, sorted by path
    pub mismatches: Vec<Mismatch>,
}

/// Bounded worker pool that classifies every indexed file exactly once.
pub struct Verifier {
    workers: usize,
    tx: Option<EventSender>,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl EventEmitter for Verifier {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl Verifier {
    /// A pool of `workers` tasks; zero is treated as one.
    #[must_use]
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            tx: None,
            progress: None,
        }
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    #[must_use]
    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Verify `items` with the run's digest algorithm, updating `stats` as
    /// items complete.
    ///
    /// Per-file problems never fail the call; they land in the counters.
    ///
    /// # Errors
    /// Returns a config error for a missing or unsupported algorithm before
    /// any item is touched, an internal error when `stats` was sized for a
    /// different number of items, or an internal error if a worker task
    /// panics.
    pub async fn verify(
        &self,
        algorithm: &str,
        items: Vec<IndexedFileItem>,
        stats: &Arc<VerificationStats>,
    ) -> Result<VerificationResult, Error> {
        let operation_id = Uuid::new_v4().to_string();

        let prepared = resolve_algorithm(algorithm)
            .map_err(Error::from)
            .and_then(|alg| check_total(stats, items.len()).map(|()| alg));
        let algorithm = match prepared {
            Ok(alg) => alg,
            Err(err) => {
                self.emit(AppEvent::Verify(VerifyEvent::Failed {
                    operation_id,
                    failure: FailureContext::from_error(&err),
                }));
                return Err(err);
            }
        };

        let item_count = items.len();
        info!(
            algorithm = algorithm.as_str(),
            items = item_count,
            workers = self.workers,
            "verification started"
        );
        self.emit(AppEvent::Verify(VerifyEvent::Started {
            operation_id: operation_id.clone(),
            algorithm: algorithm.as_str().to_string(),
            items: item_count,
            total_bytes: stats.total_bytes(),
            workers: self.workers,
        }));

        stats.start();
        let started = Instant::now();

        let (queue_tx, queue_rx) = mpsc::channel::<IndexedFileItem>(self.workers * 2);
        let queue_rx = Arc::new(Mutex::new(queue_rx));

        let mut pool = JoinSet::new();
        for _ in 0..self.workers {
            let worker = Worker {
                algorithm,
                operation_id: operation_id.clone(),
                stats: Arc::clone(stats),
                progress: self.progress.clone(),
                tx: self.tx.clone(),
            };
            let queue = Arc::clone(&queue_rx);
            pool.spawn(async move { worker.run(queue).await });
        }

        for item in items {
            if queue_tx.send(item).await.is_err() {
                // Every worker is gone; the join below reports why
                break;
            }
        }
        drop(queue_tx);

        let mut mismatches = Vec::new();
        while let Some(joined) = pool.join_next().await {
            let found =
                joined.map_err(|e| Error::internal(format!("verification worker failed: {e}")))?;
            mismatches.extend(found);
        }
        mismatches.sort_by(|a, b| a.path.cmp(&b.path));

        stats.stop();
        let snapshot = stats.snapshot();
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            processed = snapshot.processed,
            ok = snapshot.ok,
            flagged = snapshot.flagged(),
            mismatches = mismatches.len(),
            duration_ms,
            "verification completed"
        );
        self.emit(AppEvent::Verify(VerifyEvent::Completed {
            operation_id: operation_id.clone(),
            processed: snapshot.processed,
            ok: snapshot.ok,
            flagged: snapshot.flagged(),
            mismatches: mismatches.len(),
            bytes_hashed: snapshot.bytes_hashed,
            duration_ms,
        }));

        Ok(VerificationResult {
            operation_id,
            mismatches,
        })
    }
}

/// Verify `items` with a pool of `workers` tasks and no event or progress
/// reporting.
///
/// # Errors
/// See [`Verifier::verify`].
pub async fn verify(
    algorithm: &str,
    items: Vec<IndexedFileItem>,
    workers: usize,
    stats: &Arc<VerificationStats>,
) -> Result<VerificationResult, Error> {
    Verifier::new(workers).verify(algorithm, items, stats).await
}

/// Processed can only reach Total when Total counts exactly these items
fn check_total(stats: &VerificationStats, items: usize) -> Result<(), Error> {
    let expected = u64::try_from(items).unwrap_or(u64::MAX);
    if stats.total() == expected {
        Ok(())
    } else {
        Err(Error::internal(format!(
            "counters sized for {} items but {items} were queued",
            stats.total()
        )))
    }
}

pub(crate) fn resolve_algorithm(name: &str) -> Result<HashAlgorithm, ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::MissingAlgorithm);
    }
    HashAlgorithm::parse(name)
}

struct Worker {
    algorithm: HashAlgorithm,
    operation_id: String,
    stats: Arc<VerificationStats>,
    progress: Option<Arc<dyn ProgressSink>>,
    tx: Option<EventSender>,
}

impl EventEmitter for Worker {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl Worker {
    async fn run(self, queue: Arc<Mutex<mpsc::Receiver<IndexedFileItem>>>) -> Vec<Mismatch> {
        let mut mismatches = Vec::new();
        loop {
            let next = queue.lock().await.recv().await;
            let Some(item) = next else {
                break;
            };
            if let Some(mismatch) = self.check(&item).await {
                mismatches.push(mismatch);
            }
        }
        mismatches
    }

    fn advance(&self, bytes: u64) {
        if bytes == 0 {
            return;
        }
        if let Some(sink) = &self.progress {
            sink.advance(bytes);
        }
    }

    /// Classify one item. First matching rule wins; every path advances
    /// progress by exactly `item.length` in total.
    async fn check(&self, item: &IndexedFileItem) -> Option<Mismatch> {
        if let Some(reason) = &item.error {
            debug!(path = %item.path, reason = %reason, "skipping item with indexer error");
            self.finish(item, Outcome::Skipped, Some(reason.clone()));
            self.advance(item.length);
            return None;
        }

        let path = Path::new(&item.path);
        let size = match tokio::fs::metadata(path).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                warn!(path = %item.path, error = %e, "cannot stat file");
                self.finish(item, Outcome::StatError, Some(e.to_string()));
                self.advance(item.length);
                return None;
            }
        };

        if size != item.length {
            self.finish(
                item,
                Outcome::SizeMismatch,
                Some(format!("expected {} bytes, found {size}", item.length)),
            );
            self.advance(item.length);
            return None;
        }
        self.stats.add_bytes_stat_ok(size);

        let sent = AtomicU64::new(0);
        let on_progress = |n: u64| {
            self.stats.add_bytes_hashed(n);
            sent.fetch_add(n, Ordering::Relaxed);
            self.advance(n);
        };
        let digest = hash_file(path, self.algorithm, Some(&on_progress)).await;
        let remaining = item.length.saturating_sub(sent.load(Ordering::Relaxed));

        let computed = match digest {
            Ok(hex) => hex,
            Err(e) => {
                warn!(path = %item.path, error = %e, "hashing failed");
                self.finish(item, Outcome::HashError, Some(e.to_string()));
                self.advance(remaining);
                return None;
            }
        };
        self.advance(remaining);

        if digests_match(&computed, &item.hash) {
            self.stats.record(Outcome::Ok);
            return None;
        }

        self.finish(
            item,
            Outcome::HashMismatch,
            Some(format!("expected {}, computed {computed}", item.hash)),
        );
        Some(Mismatch {
            path: item.path.clone(),
            expected: item.hash.clone(),
            computed,
        })
    }

    fn finish(&self, item: &IndexedFileItem, outcome: Outcome, detail: Option<String>) {
        self.stats.record(outcome);
        let kind = match outcome {
            Outcome::Ok => return,
            Outcome::Skipped => FlagKind::Skipped,
            Outcome::StatError => FlagKind::StatError,
            Outcome::SizeMismatch => FlagKind::SizeMismatch,
            Outcome::HashError => FlagKind::HashError,
            Outcome::HashMismatch => FlagKind::HashMismatch,
        };
        debug!(path = %item.path, kind = kind.as_str(), "item flagged");
        self.emit(AppEvent::Verify(VerifyEvent::ItemFlagged {
            operation_id: self.operation_id.clone(),
            path: item.path.clone(),
            kind,
            detail,
        }));
    }
}
