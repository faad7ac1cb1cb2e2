//! Error types for observer setup.

use thiserror::Error;

/// Result type for observer operations.
pub type Result<T> = std::result::Result<T, ObserverError>;

/// Errors that can occur while attaching an observer.
///
/// Lifecycle transitions and layout events never fail; only construction does.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObserverError {
    /// The host lifecycle was already destroyed.
    #[error("lifecycle is destroyed - observers can no longer be attached")]
    LifecycleDestroyed,

    /// The lifecycle is started but no tokio runtime is available to run the subscription.
    #[error("lifecycle is started but no tokio runtime is available: {0}")]
    NoRuntime(String),
}
