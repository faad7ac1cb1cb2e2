//! Debounced, lifecycle-gated fold state observation.
//!
//! A [`DebouncedFoldObserver`] subscribes to a raw layout source while its
//! host [`Lifecycle`] is started, classifies every snapshot, and commits the
//! result only after the layout has been quiet for [`DEBOUNCE`]. Consumers read
//! the committed [`FoldState`] synchronously or follow it as a stream.
//!
//! # Example
//!
//! ```ignore
//! use foldsense_observer::{DebouncedFoldObserver, Lifecycle, ObserverConfig};
//! use foldsense_events::TracingLogSink;
//! use foldsense_posture::{BroadcastLayoutSource, HostId};
//! use std::sync::Arc;
//!
//! let lifecycle = Lifecycle::new();
//! let source = Arc::new(BroadcastLayoutSource::new());
//! let observer = DebouncedFoldObserver::attach(
//!     &lifecycle,
//!     HostId::new("message-list"),
//!     source.clone(),
//!     Arc::new(TracingLogSink),
//!     ObserverConfig::default(),
//! )?;
//!
//! lifecycle.start();
//! let mut states = observer.state_stream();
//! while let Some(state) = states.next().await {
//!     println!("fold state: {state}");
//! }
//! ```

mod config;
mod error;
mod lifecycle;
mod observer;
mod registry;

pub mod policy;

pub use config::ObserverConfig;
pub use error::{ObserverError, Result};
pub use lifecycle::{Lifecycle, LifecycleObserver, LifecyclePhase};
pub use observer::{DebouncedFoldObserver, ObserverPhase};
pub use policy::{DEBOUNCE, LOG_TAG};
pub use registry::ObserverRegistry;

pub use foldsense_posture::FoldState;
