//! Live counters for a verification pass

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Terminal classification of one indexed file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Skipped,
    StatError,
    SizeMismatch,
    HashError,
    HashMismatch,
}

/// Counters shared by every verification worker.
///
/// Owned by the caller and passed into the engine by reference, so a
/// progress renderer can read it while workers write. Each item bumps its
/// terminal counter before `processed`, so a snapshot never shows more
/// processed items than classified ones.
#[derive(Debug, Default)]
pub struct VerificationStats {
    total: u64,
    total_bytes: u64,

    processed: AtomicU64,
    ok: AtomicU64,
    skipped: AtomicU64,
    stat_errors: AtomicU64,
    size_mismatches: AtomicU64,
    hash_errors: AtomicU64,
    hash_mismatches: AtomicU64,

    bytes_hashed: AtomicU64,
    bytes_stat_ok: AtomicU64,

    started: OnceLock<Instant>,
    finished: OnceLock<Instant>,
}

impl VerificationStats {
    /// Counters for a run of `total` items carrying `total_bytes` checkable bytes
    #[must_use]
    pub fn new(total: u64, total_bytes: u64) -> Self {
        Self {
            total,
            total_bytes,
            ..Self::default()
        }
    }

    /// Record the start time. Later calls keep the first timestamp.
    pub fn start(&self) {
        let _ = self.started.set(Instant::now());
    }

    /// Record the finish time. Later calls keep the first timestamp.
    pub fn stop(&self) {
        let _ = self.finished.set(Instant::now());
    }

    /// Elapsed time, still running if `stop` has not been called
    #[must_use]
    pub fn duration(&self) -> Duration {
        match (self.started.get(), self.finished.get()) {
            (Some(start), Some(end)) => end.saturating_duration_since(*start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub(crate) fn record(&self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Ok => &self.ok,
            Outcome::Skipped => &self.skipped,
            Outcome::StatError => &self.stat_errors,
            Outcome::SizeMismatch => &self.size_mismatches,
            Outcome::HashError => &self.hash_errors,
            Outcome::HashMismatch => &self.hash_mismatches,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.processed.fetch_add(1, Ordering::Release);
    }

    pub(crate) fn add_bytes_hashed(&self, n: u64) {
        self.bytes_hashed.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn add_bytes_stat_ok(&self, n: u64) {
        self.bytes_stat_ok.fetch_add(n, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter.
    ///
    /// While workers are running the copy is only eventually consistent.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        let processed = self.processed.load(Ordering::Acquire);
        StatsSnapshot {
            total: self.total,
            total_bytes: self.total_bytes,
            processed,
            ok: self.ok.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            stat_errors: self.stat_errors.load(Ordering::Relaxed),
            size_mismatches: self.size_mismatches.load(Ordering::Relaxed),
            hash_errors: self.hash_errors.load(Ordering::Relaxed),
            hash_mismatches: self.hash_mismatches.load(Ordering::Relaxed),
            bytes_hashed: self.bytes_hashed.load(Ordering::Relaxed),
            bytes_stat_ok: self.bytes_stat_ok.load(Ordering::Relaxed),
            duration_ms: u64::try_from(self.duration().as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Serializable copy of [`VerificationStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total: u64,
    pub total_bytes: u64,
    pub processed: u64,
    pub ok: u64,
    pub skipped: u64,
    pub stat_errors: u64,
    pub size_mismatches: u64,
    pub hash_errors: u64,
    pub hash_mismatches: u64,
    pub bytes_hashed: u64,
    pub bytes_stat_ok: u64,
    pub duration_ms: u64,
}

impl StatsSnapshot {
    /// Sum of every terminal counter
    #[must_use]
    pub fn classified(&self) -> u64 {
        self.ok
            + self.skipped
            + self.stat_errors
            + self.size_mismatches
            + self.hash_errors
            + self.hash_mismatches
    }

    /// Items that could not be checked or did not match in size
    #[must_use]
    pub fn errors(&self) -> u64 {
        self.stat_errors + self.size_mismatches + self.hash_errors
    }

    /// Items with any non-OK outcome
    #[must_use]
    pub fn flagged(&self) -> u64 {
        self.classified() - self.ok
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn throughput_bytes_per_sec(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        self.bytes_hashed as f64 / (self.duration_ms as f64 / 1000.0)
    }

    /// Decimal megabytes (10^6 bytes) per second
    #[must_use]
    pub fn throughput_mb_per_sec(&self) -> f64 {
        self.throughput_bytes_per_sec() / 1_000_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_processed_in_step() {
        let stats = VerificationStats::new(4, 100);
        stats.record(Outcome::Ok);
        stats.record(Outcome::Skipped);
        stats.record(Outcome::HashMismatch);
        stats.record(Outcome::HashMismatch);

        let snap = stats.snapshot();
        assert_eq!(snap.processed, 4);
        assert_eq!(snap.classified(), 4);
        assert_eq!(snap.hash_mismatches, 2);
        assert_eq!(snap.flagged(), 3);
        assert_eq!(snap.errors(), 0);
        assert_eq!(snap.total, 4);
        assert_eq!(snap.total_bytes, 100);
    }

    #[test]
    fn test_duration_before_start_is_zero() {
        let stats = VerificationStats::default();
        assert_eq!(stats.duration(), Duration::ZERO);
        stats.start();
        stats.stop();
        let first = stats.duration();
        stats.stop();
        assert_eq!(stats.duration(), first);
    }

    #[test]
    fn test_throughput() {
        let snap = StatsSnapshot {
            bytes_hashed: 4_000_000,
            duration_ms: 2000,
            ..StatsSnapshot::default()
        };
        assert!((snap.throughput_mb_per_sec() - 2.0).abs() < f64::EPSILON);
        assert!(StatsSnapshot::default().throughput_bytes_per_sec().abs() < f64::EPSILON);
    }
}
