//! Issue Classification — instantaneous candidates from one feature set
//!
//! Pure and stateless: (features, thresholds) → the set of issues present at
//! this instant. Debouncing is the stabilizer's job; this module answers only
//! "what does this single frame look like".
//!
//! The classifier is a rule table keyed by issue. Adding an issue means
//! adding one row, not a new code path. Multiple candidates may coexist in
//! the same tick (e.g. head tilted AND too close).

use crate::config::ThresholdConfig;
use crate::types::{FeatureSet, Issue, IssueSet};

type Rule = fn(&FeatureSet, &ThresholdConfig) -> bool;

/// One rule per bad issue, in priority order.
const RULES: [(Issue, Rule); Issue::BAD_COUNT] = [
    (Issue::TooClose, too_close),
    (Issue::TooFar, too_far),
    (Issue::HeadDown, head_down),
    (Issue::HeadUp, head_up),
    (Issue::HeadTiltLeft, head_tilt_left),
    (Issue::HeadTiltRight, head_tilt_right),
    (Issue::ShouldersUnlevel, shoulders_unlevel),
    (Issue::ShouldersDepthMisaligned, shoulders_depth_misaligned),
    (Issue::BodyLeanLeft, body_lean_left),
    (Issue::BodyLeanRight, body_lean_right),
];

/// Candidate issues present in this instant's features.
pub fn classify(features: &FeatureSet, thresholds: &ThresholdConfig) -> IssueSet {
    RULES
        .iter()
        .filter(|(_, rule)| rule(features, thresholds))
        .map(|(issue, _)| *issue)
        .collect()
}

// ============================================================================
// Rules
// ============================================================================

// Distance rules only fire once the face-area baseline exists; without it
// there is no reference to judge against (no hard-coded absolute area).
fn too_close(f: &FeatureSet, t: &ThresholdConfig) -> bool {
    f.face_area_ratio.is_some_and(|r| r >= t.too_close_factor)
}

fn too_far(f: &FeatureSet, t: &ThresholdConfig) -> bool {
    f.face_area_ratio.is_some_and(|r| r <= t.too_far_factor)
}

// Forward-head craning and neck compression both read as a dropped head, so
// they feed the same issue as the pitch offset.
fn head_down(f: &FeatureSet, t: &ThresholdConfig) -> bool {
    f.head_pitch >= t.head_pitch_down || f.forward_head || f.slouch
}

fn head_up(f: &FeatureSet, t: &ThresholdConfig) -> bool {
    f.head_pitch <= t.head_pitch_up
}

fn head_tilt_left(f: &FeatureSet, t: &ThresholdConfig) -> bool {
    f.roll_deg <= -t.head_roll_deg
}

fn head_tilt_right(f: &FeatureSet, t: &ThresholdConfig) -> bool {
    f.roll_deg >= t.head_roll_deg
}

fn shoulders_unlevel(f: &FeatureSet, t: &ThresholdConfig) -> bool {
    f.shoulder_dy >= t.shoulder_dy
}

fn shoulders_depth_misaligned(f: &FeatureSet, t: &ThresholdConfig) -> bool {
    f.shoulder_dz >= t.shoulder_dz
}

fn body_lean_left(f: &FeatureSet, t: &ThresholdConfig) -> bool {
    f.body_offset_x <= -t.body_lean_x
}

fn body_lean_right(f: &FeatureSet, t: &ThresholdConfig) -> bool {
    f.body_offset_x >= t.body_lean_x
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral() -> FeatureSet {
        FeatureSet {
            head_pitch: 0.05,
            neck_len: 0.25,
            ..FeatureSet::default()
        }
    }

    #[test]
    fn neutral_features_produce_no_candidates() {
        let set = classify(&neutral(), &ThresholdConfig::default());
        assert!(set.is_empty());
    }

    #[test]
    fn roll_sign_selects_tilt_side() {
        let t = ThresholdConfig::default();
        let mut f = neutral();
        f.roll_deg = 13.0;
        assert!(classify(&f, &t).contains(Issue::HeadTiltRight));
        f.roll_deg = -13.0;
        assert!(classify(&f, &t).contains(Issue::HeadTiltLeft));
        f.roll_deg = 11.9;
        assert!(classify(&f, &t).is_empty());
    }

    #[test]
    fn pitch_extremes_select_head_down_or_up() {
        let t = ThresholdConfig::default();
        let mut f = neutral();
        f.head_pitch = 0.10;
        assert!(classify(&f, &t).contains(Issue::HeadDown));
        f.head_pitch = 0.02;
        assert!(classify(&f, &t).contains(Issue::HeadUp));
        f.head_pitch = 0.05;
        assert!(classify(&f, &t).is_empty());
    }

    #[test]
    fn forward_head_and_slouch_are_head_down_proxies() {
        let t = ThresholdConfig::default();
        let mut f = neutral();
        f.forward_head = true;
        assert!(classify(&f, &t).contains(Issue::HeadDown));

        let mut f = neutral();
        f.slouch = true;
        assert!(classify(&f, &t).contains(Issue::HeadDown));
    }

    #[test]
    fn distance_rules_need_a_ratio() {
        let t = ThresholdConfig::default();
        let mut f = neutral();
        f.face_area = 0.05;
        f.face_area_ratio = None;
        assert!(classify(&f, &t).is_empty());

        f.face_area_ratio = Some(1.35);
        assert!(classify(&f, &t).contains(Issue::TooClose));
        f.face_area_ratio = Some(0.75);
        assert!(classify(&f, &t).contains(Issue::TooFar));
        f.face_area_ratio = Some(1.0);
        assert!(classify(&f, &t).is_empty());
    }

    #[test]
    fn lean_sign_selects_side() {
        let t = ThresholdConfig::default();
        let mut f = neutral();
        f.body_offset_x = -0.06;
        assert!(classify(&f, &t).contains(Issue::BodyLeanLeft));
        f.body_offset_x = 0.06;
        assert!(classify(&f, &t).contains(Issue::BodyLeanRight));
    }

    #[test]
    fn candidates_can_coexist() {
        let t = ThresholdConfig::default();
        let mut f = neutral();
        f.roll_deg = 15.0;
        f.face_area_ratio = Some(1.5);
        f.shoulder_dy = 0.04;
        let set = classify(&f, &t);
        assert_eq!(
            set.to_vec(),
            vec![
                Issue::TooClose,
                Issue::HeadTiltRight,
                Issue::ShouldersUnlevel
            ]
        );
    }
}
