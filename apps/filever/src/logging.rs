//! Structured logging integration for events
//!
//! Converts domain events coming off the event channel into tracing records
//! with structured fields, so `--debug` JSON logs carry the whole run.

use filever_events::{
    AppEvent, CompareEvent, EventMessage, GeneralEvent, IndexEvent, VerifyEvent,
};
use tracing::{debug, error, info, warn};

/// Log an `AppEvent` using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    let source = meta.source.as_str();

    match &message.event {
        AppEvent::General(general) => match general {
            GeneralEvent::Warning { message, context } => {
                warn!(source, event_id = %meta.event_id, context = ?context, "{message}");
            }
            GeneralEvent::Error { message, details } => {
                error!(source, event_id = %meta.event_id, details = ?details, "{message}");
            }
            GeneralEvent::DebugLog { message } => {
                debug!(source, event_id = %meta.event_id, "{message}");
            }
            GeneralEvent::OperationStarted { operation } => {
                info!(source, event_id = %meta.event_id, operation = %operation, "Operation started");
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                info!(
                    source,
                    event_id = %meta.event_id,
                    operation = %operation,
                    success,
                    "Operation completed"
                );
            }
            GeneralEvent::OperationFailed { operation, error } => {
                error!(
                    source,
                    event_id = %meta.event_id,
                    operation = %operation,
                    error = %error,
                    "Operation failed"
                );
            }
        },

        AppEvent::Index(index) => match index {
            IndexEvent::LoadStarted { path } => {
                debug!(source, event_id = %meta.event_id, path = %path, "Index load started");
            }
            IndexEvent::Loaded {
                path,
                algorithm,
                items,
                errored_items,
                total_bytes,
            } => {
                info!(
                    source,
                    event_id = %meta.event_id,
                    path = %path,
                    algorithm = %algorithm,
                    items,
                    errored_items,
                    total_bytes,
                    "Index loaded"
                );
            }
            IndexEvent::LoadFailed { path, failure } => {
                error!(
                    source,
                    event_id = %meta.event_id,
                    path = %path,
                    code = ?failure.code,
                    error = %failure.message,
                    hint = ?failure.hint,
                    "Index load failed"
                );
            }
        },

        AppEvent::Verify(verify) => match verify {
            VerifyEvent::Started {
                algorithm,
                items,
                total_bytes,
                workers,
                ..
            } => {
                info!(
                    source,
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    algorithm = %algorithm,
                    items,
                    total_bytes,
                    workers,
                    "Verification started"
                );
            }
            VerifyEvent::ItemFlagged {
                path, kind, detail, ..
            } => {
                warn!(
                    source,
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    path = %path,
                    kind = kind.as_str(),
                    detail = ?detail,
                    "File flagged"
                );
            }
            VerifyEvent::Completed {
                processed,
                ok,
                flagged,
                mismatches,
                bytes_hashed,
                duration_ms,
                ..
            } => {
                info!(
                    source,
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    processed,
                    ok,
                    flagged,
                    mismatches,
                    bytes_hashed,
                    duration_ms,
                    "Verification completed"
                );
            }
            VerifyEvent::Failed { failure, .. } => {
                error!(
                    source,
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    code = ?failure.code,
                    error = %failure.message,
                    hint = ?failure.hint,
                    "Verification failed"
                );
            }
        },

        AppEvent::Compare(compare) => match compare {
            CompareEvent::Started {
                files,
                splits,
                algorithm,
                ..
            } => {
                info!(
                    source,
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    files,
                    splits,
                    algorithm = %algorithm,
                    "Split comparison started"
                );
            }
            CompareEvent::WindowDiffers {
                window, start, len, ..
            } => {
                warn!(
                    source,
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    window,
                    start,
                    len,
                    "Window differs"
                );
            }
            CompareEvent::Completed {
                differing,
                min_size,
                max_size,
                duration_ms,
                ..
            } => {
                info!(
                    source,
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    differing,
                    min_size,
                    max_size,
                    duration_ms,
                    "Split comparison completed"
                );
            }
            CompareEvent::Failed { failure, .. } => {
                error!(
                    source,
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    code = ?failure.code,
                    error = %failure.message,
                    hint = ?failure.hint,
                    "Split comparison failed"
                );
            }
        },
    }
}
