use serde::{Deserialize, Serialize};

use crate::{EventMeta, EventSource};
use filever_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code such as `index.no_root_object`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod compare;
pub mod general;
pub mod index;
pub mod verify;

pub use compare::*;
pub use general::*;
pub use index::*;
pub use verify::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// Index loading
    Index(IndexEvent),

    /// Verification passes over an index
    Verify(VerifyEvent),

    /// Split comparisons between files
    Compare(CompareEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Index(_) => EventSource::INDEX,
            Self::Verify(_) => EventSource::VERIFY,
            Self::Compare(_) => EventSource::COMPARE,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. } | GeneralEvent::OperationFailed { .. })
            | Self::Index(IndexEvent::LoadFailed { .. })
            | Self::Verify(VerifyEvent::Failed { .. })
            | Self::Compare(CompareEvent::Failed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Verify(VerifyEvent::ItemFlagged { .. })
            | Self::Compare(CompareEvent::WindowDiffers { .. }) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Index(IndexEvent::LoadStarted { .. }) => Level::DEBUG,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "filever::events::general",
            Self::Index(_) => "filever::events::index",
            Self::Verify(_) => "filever::events::verify",
            Self::Compare(_) => "filever::events::compare",
        }
    }

    /// Operation id carried by the event, if any.
    #[must_use]
    pub fn operation_id(&self) -> Option<&str> {
        match self {
            Self::Verify(
                VerifyEvent::Started { operation_id, .. }
                | VerifyEvent::ItemFlagged { operation_id, .. }
                | VerifyEvent::Completed { operation_id, .. }
                | VerifyEvent::Failed { operation_id, .. },
            )
            | Self::Compare(
                CompareEvent::Started { operation_id, .. }
                | CompareEvent::WindowDiffers { operation_id, .. }
                | CompareEvent::Completed { operation_id, .. }
                | CompareEvent::Failed { operation_id, .. },
            ) => Some(operation_id.as_str()),
            Self::General(_) | Self::Index(_) => None,
        }
    }
}

/// An event paired with the metadata used when it is logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    #[must_use]
    pub fn new(meta: EventMeta, event: AppEvent) -> Self {
        Self { meta, event }
    }

    /// Wrap an event, deriving level, source and correlation id from it.
    #[must_use]
    pub fn from_event(event: AppEvent) -> Self {
        let mut meta = EventMeta::new(event.log_level(), event.event_source());
        if let Some(id) = event.operation_id() {
            meta = meta.with_correlation_id(id);
        }
        Self { meta, event }
    }
}
