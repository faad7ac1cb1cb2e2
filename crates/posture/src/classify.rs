//! Snapshot classification.
//!
//! Pure domain logic - no state, no I/O, no logging.

use crate::feature::{HingeState, RawLayoutSnapshot};
use crate::state::FoldState;

/// Classify a raw layout snapshot.
///
/// Rules:
/// 1. No features -> `Unknown`
/// 2. First folding feature with a `Flat` or `HalfOpened` hinge -> `Unfolded`
/// 3. Nothing recognized -> `Unknown`
///
/// Features that are not folds, folds without a hinge state, and
/// unrecognized hinge values are skipped.
pub fn classify(snapshot: &RawLayoutSnapshot) -> FoldState {
    snapshot
        .features
        .iter()
        .find_map(|feature| match feature.hinge()? {
            HingeState::Flat | HingeState::HalfOpened => Some(FoldState::Unfolded),
            HingeState::Other(_) => None,
        })
        .unwrap_or(FoldState::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::DisplayFeature;

    fn snapshot(features: Vec<DisplayFeature>) -> RawLayoutSnapshot {
        RawLayoutSnapshot::new(features)
    }

    #[test]
    fn test_empty_is_unknown() {
        assert_eq!(classify(&RawLayoutSnapshot::empty()), FoldState::Unknown);
    }

    #[test]
    fn test_flat_is_unfolded() {
        let s = snapshot(vec![DisplayFeature::fold(HingeState::Flat)]);
        assert_eq!(classify(&s), FoldState::Unfolded);
    }

    #[test]
    fn test_half_opened_is_unfolded() {
        let s = snapshot(vec![DisplayFeature::fold(HingeState::HalfOpened)]);
        assert_eq!(classify(&s), FoldState::Unfolded);
    }

    #[test]
    fn test_unrecognized_hinge_is_unknown() {
        let s = snapshot(vec![DisplayFeature::fold(HingeState::Other("TENT".into()))]);
        assert_eq!(classify(&s), FoldState::Unknown);
    }

    #[test]
    fn test_fold_without_hinge_is_unknown() {
        let s = snapshot(vec![DisplayFeature::Fold { hinge: None }]);
        assert_eq!(classify(&s), FoldState::Unknown);
    }

    #[test]
    fn test_non_fold_features_are_skipped() {
        let s = snapshot(vec![
            DisplayFeature::Cutout,
            DisplayFeature::Other {
                name: "rounded_corner".into(),
            },
        ]);
        assert_eq!(classify(&s), FoldState::Unknown);

        let s = snapshot(vec![
            DisplayFeature::Cutout,
            DisplayFeature::fold(HingeState::Other("TENT".into())),
            DisplayFeature::fold(HingeState::HalfOpened),
        ]);
        assert_eq!(classify(&s), FoldState::Unfolded);
    }

    #[test]
    fn test_never_produces_folded() {
        let hinges = [
            None,
            Some(HingeState::Flat),
            Some(HingeState::HalfOpened),
            Some(HingeState::Other("CLOSED".into())),
        ];
        for hinge in hinges {
            let s = snapshot(vec![DisplayFeature::Fold { hinge }]);
            assert_ne!(classify(&s), FoldState::Folded);
        }
    }
}
