//! Device posture model for foldsense.
//!
//! This crate holds everything about fold state that does not depend on time:
//! - The `FoldState` enum that layout code consumes
//! - Raw display feature snapshots as reported by the platform
//! - The pure classifier mapping a snapshot to a `FoldState`
//! - The `LayoutSource` trait the platform bridge implements
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  state.rs    - FoldState enum                               │
//! │  feature.rs  - DisplayFeature, HingeState, RawLayoutSnapshot│
//! │  classify.rs - Snapshot -> FoldState (pure)                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Infrastructure Layer                        │
//! │  source.rs   - LayoutSource trait, broadcast bridge         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Debouncing and lifecycle gating live in `foldsense-observer`.

mod classify;
mod feature;
mod source;
mod state;

pub use classify::classify;
pub use feature::{DisplayFeature, HingeState, RawLayoutSnapshot};
pub use source::{
    BroadcastLayoutSource, HostId, LayoutSource, LayoutSourceRef, NullLayoutSource,
    DEFAULT_CHANNEL_CAPACITY,
};
pub use state::{FoldState, ParseFoldStateError};
