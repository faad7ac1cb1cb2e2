//! Observer configuration.

use crate::policy::{DEBOUNCE, LOG_TAG};
use std::time::Duration;

/// Construction-time settings of a [`DebouncedFoldObserver`](crate::DebouncedFoldObserver).
///
/// There is no per-event override; the window is fixed for the life of the
/// instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverConfig {
    /// Debounce window applied to raw layout events.
    pub debounce: Duration,
    /// Component tag used for commit records.
    pub log_tag: String,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            debounce: DEBOUNCE,
            log_tag: LOG_TAG.to_string(),
        }
    }
}

impl ObserverConfig {
    pub fn with_log_tag(mut self, tag: impl Into<String>) -> Self {
        self.log_tag = tag.into();
        self
    }
}
