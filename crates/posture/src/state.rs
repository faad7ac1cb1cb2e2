//! Fold state definitions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Physical fold configuration of the device, as seen by layout code.
///
/// This is the only state the observer exposes. It is never absent:
/// "no data" is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FoldState {
    /// Fully open, or half open in the "laptop" posture.
    Unfolded,

    /// Closed down to the small outer screen.
    ///
    /// The classifier never produces this value; it exists for collaborators
    /// that infer a closed device from signals outside this crate.
    Folded,

    /// No fold-capable feature reported, or its data is indeterminate.
    #[default]
    Unknown,
}

impl FoldState {
    /// All values, in declaration order.
    pub const ALL: [FoldState; 3] = [FoldState::Unfolded, FoldState::Folded, FoldState::Unknown];

    pub fn label(&self) -> &'static str {
        match self {
            FoldState::Unfolded => "unfolded",
            FoldState::Folded => "folded",
            FoldState::Unknown => "unknown",
        }
    }

    /// Whether the device is open enough for a split layout.
    pub fn is_unfolded(&self) -> bool {
        matches!(self, FoldState::Unfolded)
    }
}

impl std::fmt::Display for FoldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Returned when a string does not name a fold state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown fold state '{0}' (expected unfolded, folded or unknown)")]
pub struct ParseFoldStateError(pub String);

impl FromStr for FoldState {
    type Err = ParseFoldStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        FoldState::ALL
            .into_iter()
            .find(|state| state.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseFoldStateError(s.to_string()))
    }
}
