//! Raw display features as reported by the platform window manager.

use serde::{Deserialize, Serialize};

/// Hinge configuration carried by a folding feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HingeState {
    /// Both halves form one flat surface.
    Flat,

    /// Halves at an angle, e.g. propped up like a laptop.
    HalfOpened,

    /// A value this build does not recognize. Kept verbatim for diagnostics.
    Other(String),
}

impl HingeState {
    /// Map the platform's string constant (`"FLAT"`, `"HALF_OPENED"`, ...).
    pub fn from_platform(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "FLAT" => HingeState::Flat,
            "HALF_OPENED" | "HALF-OPENED" => HingeState::HalfOpened,
            _ => HingeState::Other(value.to_string()),
        }
    }
}

/// One display characteristic of the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayFeature {
    /// A hinge or fold. `hinge` is `None` when the platform did not report it.
    Fold { hinge: Option<HingeState> },

    /// A camera cutout or similar obstruction.
    Cutout,

    /// Any other feature type.
    Other { name: String },
}

impl DisplayFeature {
    /// Folding feature with a reported hinge state.
    pub fn fold(hinge: HingeState) -> Self {
        DisplayFeature::Fold { hinge: Some(hinge) }
    }

    /// Hinge state, if this is a folding feature that reports one.
    pub fn hinge(&self) -> Option<&HingeState> {
        match self {
            DisplayFeature::Fold { hinge } => hinge.as_ref(),
            _ => None,
        }
    }
}

/// Snapshot of all display features of a window at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLayoutSnapshot {
    #[serde(default)]
    pub features: Vec<DisplayFeature>,
}

impl RawLayoutSnapshot {
    pub fn new(features: Vec<DisplayFeature>) -> Self {
        Self { features }
    }

    /// Snapshot with no features at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_feature(mut self, feature: DisplayFeature) -> Self {
        self.features.push(feature);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl From<Vec<DisplayFeature>> for RawLayoutSnapshot {
    fn from(features: Vec<DisplayFeature>) -> Self {
        Self::new(features)
    }
}
