//! Command execution

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use filever_config::{resolve_workers, Config};
use filever_events::EventSender;
use filever_guard::{SplitComparator, StatsSnapshot, VerificationStats, Verifier};
use filever_index::IndexLoader;
use filever_types::{IndexedFileItem, Mismatch, RunInfo, SplitComparisonResult};
use serde::Serialize;
use tracing::info;

use crate::error::CliError;
use crate::progress::{ByteCounter, ProgressLine};

/// Result of a command, rendered by [`crate::display::OutputRenderer`]
#[derive(Debug, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CommandOutcome {
    Verify(VerifyReport),
    Splits(SplitComparisonResult),
}

/// Everything `filever verify` reports once the pass has drained
#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub index: PathBuf,
    pub run: RunInfo,
    pub workers: usize,
    pub stats: StatsSnapshot,
    pub throughput_mb_per_sec: f64,
    pub mismatches: Vec<Mismatch>,
    pub report_path: PathBuf,
}

/// How live progress should be shown while verifying
#[derive(Debug, Clone, Copy)]
pub struct ProgressMode {
    pub enabled: bool,
    pub colors: bool,
}

pub async fn verify_index(
    index_path: &Path,
    config: &Config,
    tx: EventSender,
    progress: ProgressMode,
) -> Result<CommandOutcome, CliError> {
    let index = IndexLoader::new()
        .with_event_sender(tx.clone())
        .load(index_path)
        .await?;

    let total = u64::try_from(index.items.len()).unwrap_or(u64::MAX);
    let stats = Arc::new(VerificationStats::new(total, index.run.total_bytes));
    let workers = resolve_workers(config.verify.workers);
    let mut verifier = Verifier::new(workers).with_event_sender(tx);

    let line = if progress.enabled {
        let counter = Arc::new(ByteCounter::default());
        let bytes_total = bytes_to_visit(&index.items);
        verifier = verifier.with_progress(counter.clone());
        Some(ProgressLine::spawn(
            Arc::clone(&stats),
            counter,
            bytes_total,
            Duration::from_millis(config.verify.progress_interval_ms),
            progress.colors,
        ))
    } else {
        None
    };

    let outcome = verifier
        .verify(&index.run.algorithm, index.items, &stats)
        .await;
    if let Some(line) = line {
        line.finish().await;
    }
    let result = outcome?;

    let report_path = config.verify.report_path.clone();
    write_report(&report_path, &result.mismatches).await?;
    info!(
        path = %report_path.display(),
        mismatches = result.mismatches.len(),
        "mismatch report written"
    );

    let snapshot = stats.snapshot();
    Ok(CommandOutcome::Verify(VerifyReport {
        index: index_path.to_path_buf(),
        run: index.run,
        workers,
        throughput_mb_per_sec: snapshot.throughput_mb_per_sec(),
        stats: snapshot,
        mismatches: result.mismatches,
        report_path,
    }))
}

/// Bytes the progress counter will see over a whole pass, errored records included
fn bytes_to_visit(items: &[IndexedFileItem]) -> u64 {
    items
        .iter()
        .fold(0u64, |sum, item| sum.saturating_add(item.length))
}

pub async fn compare_files(
    files: &[PathBuf],
    config: &Config,
    tx: EventSender,
) -> Result<CommandOutcome, CliError> {
    let result = SplitComparator::new()
        .with_event_sender(tx)
        .compare(files, config.compare.splits, &config.compare.algorithm)
        .await?;
    Ok(CommandOutcome::Splits(result))
}

/// Write one mismatched path per line, replacing any previous report.
pub async fn write_report(path: &Path, mismatches: &[Mismatch]) -> Result<(), CliError> {
    let mut body = String::new();
    for mismatch in mismatches {
        body.push_str(&mismatch.path);
        body.push('\n');
    }
    tokio::fs::write(path, body)
        .await
        .map_err(|source| CliError::Report {
            path: path.to_path_buf(),
            source,
        })
}
