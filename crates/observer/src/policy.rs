//! Timing and naming policy for fold state observation.

use std::time::Duration;

/// Quiet period a layout change must survive before it is committed.
/// Every new raw event restarts it.
pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// Component tag of commit records.
pub const LOG_TAG: &str = "FoldStateObserver";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(DEBOUNCE.as_millis(), 300);
        assert!(!LOG_TAG.is_empty());
    }
}
