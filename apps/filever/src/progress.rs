//! Live progress line for `filever verify`

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use console::Term;
use filever_guard::{ProgressSink, StatsSnapshot, VerificationStats};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Byte counter fed from the hashing hot path.
///
/// `advance` is a single atomic add; all formatting happens on the ticker
/// task started by [`ProgressLine::spawn`].
#[derive(Debug, Default)]
pub struct ByteCounter {
    bytes: AtomicU64,
}

impl ByteCounter {
    pub fn get(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }
}

impl ProgressSink for ByteCounter {
    fn advance(&self, bytes: u64) {
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
    }
}

/// Redraws one status line on stderr at a fixed interval.
pub struct ProgressLine {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl ProgressLine {
    /// Start the ticker task; it reads `stats` and `counter` every `interval`.
    ///
    /// `bytes_total` is the sum of every item's recorded length, skipped
    /// items included, since those advance the counter too.
    pub fn spawn(
        stats: Arc<VerificationStats>,
        counter: Arc<ByteCounter>,
        bytes_total: u64,
        interval: Duration,
        colors: bool,
    ) -> Self {
        let (stop, mut stopped) = oneshot::channel();
        let term = Term::stderr();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut rate = RateWindow::new();
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let snap = stats.snapshot();
                        let mbps = rate.sample(snap.bytes_hashed);
                        let line = render_line(&snap, counter.get(), bytes_total, mbps, colors);
                        let _ = term.clear_line();
                        let _ = term.write_str(&line);
                    }
                    _ = &mut stopped => break,
                }
            }
            let _ = term.clear_line();
            let _ = term.flush();
        });

        Self { stop, handle }
    }

    /// Stop redrawing and clear the line.
    pub async fn finish(self) {
        let _ = self.stop.send(());
        let _ = self.handle.await;
    }
}

/// Throughput over the interval since the previous sample
struct RateWindow {
    last_bytes: u64,
    last_at: Instant,
}

impl RateWindow {
    fn new() -> Self {
        Self {
            last_bytes: 0,
            last_at: Instant::now(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn sample(&mut self, bytes_hashed: u64) -> f64 {
        let now = Instant::now();
        let dt = now.duration_since(self.last_at).as_secs_f64();
        let delta = bytes_hashed.saturating_sub(self.last_bytes);
        self.last_bytes = bytes_hashed;
        self.last_at = now;
        if dt > 0.0 {
            delta as f64 / 1_000_000.0 / dt
        } else {
            0.0
        }
    }
}

/// Format the status line for one snapshot.
pub fn render_line(
    snap: &StatsSnapshot,
    bytes_done: u64,
    bytes_total: u64,
    mbps: f64,
    colors: bool,
) -> String {
    let percent = if bytes_total == 0 {
        100
    } else {
        let done = u128::from(bytes_done.min(bytes_total));
        u64::try_from(done * 100 / u128::from(bytes_total)).unwrap_or(100)
    };
    let errors = snap.stat_errors + snap.hash_errors;

    let mismatches = if colors && snap.hash_mismatches > 0 {
        console::style(snap.hash_mismatches).red().to_string()
    } else {
        snap.hash_mismatches.to_string()
    };

    format!(
        "hashing {}/{} files | ok={} hash_mismatches={} err={} skip={} | {:.1} MB/s | {percent:>3}%",
        snap.processed, snap.total, snap.ok, mismatches, errors, snap.skipped, mbps,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_accumulates() {
        let counter = ByteCounter::default();
        counter.advance(10);
        counter.advance(32);
        assert_eq!(counter.get(), 42);
    }

    #[test]
    fn test_render_line() {
        let snap = StatsSnapshot {
            total: 10,
            processed: 4,
            ok: 2,
            skipped: 1,
            stat_errors: 1,
            hash_errors: 1,
            hash_mismatches: 0,
            ..StatsSnapshot::default()
        };
        let line = render_line(&snap, 50, 200, 12.34, false);
        assert_eq!(
            line,
            "hashing 4/10 files | ok=2 hash_mismatches=0 err=2 skip=1 | 12.3 MB/s |  25%"
        );
    }

    #[test]
    fn test_render_line_clamps_percent() {
        let snap = StatsSnapshot::default();
        assert!(render_line(&snap, 250, 100, 0.0, false).ends_with("100%"));
        assert!(render_line(&snap, 0, 0, 0.0, false).ends_with("100%"));
        assert!(render_line(&snap, 0, 100, 0.0, false).ends_with("  0%"));
    }
}
