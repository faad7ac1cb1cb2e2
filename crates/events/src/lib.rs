//! Logging contract for fold state observation.
//!
//! Committed fold state transitions are reported through a [`LogSink`] as a
//! (tag, message, args) record. The args payload is a serialized
//! [`FoldStateChanged`], so consumers never depend on field names by accident.

mod sink;

pub use sink::{InMemoryLogSink, LogRecord, LogSink, LogSinkRef, NullLogSink, TracingLogSink};

use foldsense_posture::{FoldState, HostId};
use serde::{Deserialize, Serialize};

/// Record written once per committed fold state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldStateChanged {
    /// Host window the observer is attached to.
    pub host: HostId,
    /// Previously committed state.
    pub old: FoldState,
    /// Newly committed state.
    pub new: FoldState,
    /// Commit time in milliseconds since epoch.
    #[serde(default)]
    pub ts_ms: i64,
}

impl FoldStateChanged {
    pub fn new(host: HostId, old: FoldState, new: FoldState) -> Self {
        Self {
            host,
            old,
            new,
            ts_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Serialize into the `args` payload of a log record.
    pub fn to_args(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Log messages as constants to prevent typos.
pub mod log_messages {
    /// A debounced fold state was committed.
    pub const STATE_CHANGED: &str = "fold state changed";
}
