//! Log sink abstraction for committed state transitions.
//!
//! Keeps the observer independent of any particular logging backend, so
//! tests can capture exactly what was reported.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Fire-and-forget destination for component log records.
///
/// Implementations must not block and must not fail; they are called on the
/// commit path.
pub trait LogSink: Send + Sync {
    /// Record a message.
    ///
    /// # Arguments
    /// * `tag` - Component tag (e.g., "FoldStateObserver")
    /// * `message` - Human-readable message
    /// * `args` - Structured arguments
    fn log(&self, tag: &str, message: &str, args: serde_json::Value);
}

/// Type alias for shared log sink reference.
pub type LogSinkRef = Arc<dyn LogSink>;

/// Forwards records to `tracing` at info level.
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, tag: &str, message: &str, args: serde_json::Value) {
        tracing::info!(tag, %args, "{}", message);
    }
}

/// A captured record from [`InMemoryLogSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub tag: String,
    pub message: String,
    pub args: serde_json::Value,
}

/// In-memory sink for testing.
///
/// Captures all records for later inspection.
#[derive(Default)]
pub struct InMemoryLogSink {
    records: Mutex<Vec<LogRecord>>,
}

impl InMemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured records, oldest first.
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    /// Records for a specific tag.
    pub fn records_for(&self, tag: &str) -> Vec<LogRecord> {
        self.lock()
            .iter()
            .filter(|r| r.tag == tag)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogSink for InMemoryLogSink {
    fn log(&self, tag: &str, message: &str, args: serde_json::Value) {
        self.lock().push(LogRecord {
            tag: tag.to_string(),
            message: message.to_string(),
            args,
        });
    }
}

/// Sink that discards everything.
pub struct NullLogSink;

impl LogSink for NullLogSink {
    fn log(&self, _tag: &str, _message: &str, _args: serde_json::Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_in_memory_sink() {
        let sink = InMemoryLogSink::new();

        sink.log("FoldStateObserver", "first", json!({"n": 1}));
        sink.log("Other", "second", json!({}));
        sink.log("FoldStateObserver", "third", json!({"n": 3}));

        assert_eq!(sink.len(), 3);
        let ours = sink.records_for("FoldStateObserver");
        assert_eq!(ours.len(), 2);
        assert_eq!(ours[1].message, "third");
        assert_eq!(ours[1].args["n"], 3);
        assert!(sink.records_for("missing").is_empty());
    }

    #[test]
    fn test_in_memory_sink_clear() {
        let sink = InMemoryLogSink::new();

        sink.log("tag", "message", json!(null));
        assert!(!sink.is_empty());

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_null_and_tracing_sinks() {
        // Should not panic
        NullLogSink.log("tag", "ignored", json!({"data": 1}));
        TracingLogSink.log("tag", "no subscriber installed", json!({"data": 2}));
    }
}
