//! Diagnostics emitted while resolving event timestamps
//!
//! A bad time field usually stays bad for the whole stream, so the
//! resolver reports only the first failure per parser instance. The
//! `WarnOnce` flag decides which failure that is; the `DiagnosticSink`
//! decides where it goes.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::event::FieldValue;

/// Why a timestamp could not be taken from the event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWarningReason {
    /// The configured time field is absent
    MissingField,
    /// The configured time field is neither a string nor an integer
    UnknownType,
    /// The configured time field did not match any time layout
    UnparseableField,
    /// A candidate time field was found but did not match any time layout
    UnparseableInferredField,
}

impl TimeWarningReason {
    pub fn message(&self) -> &'static str {
        match self {
            TimeWarningReason::MissingField => "couldn't find specified time field",
            TimeWarningReason::UnknownType => "found time field but unknown type",
            TimeWarningReason::UnparseableField => "found time field but failed to parse",
            TimeWarningReason::UnparseableInferredField => {
                "inferred timestamp field but failed to parse as valid time"
            }
        }
    }
}

impl fmt::Display for TimeWarningReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Structured warning about an unusable time field
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWarning {
    pub field: String,
    pub value: Option<FieldValue>,
    pub reason: TimeWarningReason,
}

/// Receives the one-time timestamp warning
pub trait DiagnosticSink: Send + Sync {
    fn warn_time(&self, warning: &TimeWarning);
}

/// Default sink: a `tracing` warning event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn_time(&self, warning: &TimeWarning) {
        tracing::warn!(
            time_field = %warning.field,
            time_value = ?warning.value.as_ref().map(|v| v.to_string()),
            "{}; events will use the current time instead",
            warning.reason
        );
    }
}

/// Set-once flag shared by all workers of one parser
#[derive(Debug, Default)]
pub struct WarnOnce {
    fired: AtomicBool,
}

impl WarnOnce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true for exactly one caller over the lifetime of the flag
    pub fn try_claim(&self) -> bool {
        self.fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}
