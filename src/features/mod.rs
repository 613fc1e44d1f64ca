//! Feature Extraction — one raw landmark frame to named measurements
//!
//! A pure function of (frame, baseline, thresholds): no history, no side
//! effects. The controller owns the decision of what to do with the result;
//! this module only measures.
//!
//! Mirroring: when the capture preview is mirrored, body x coordinates are
//! flipped (x ↦ 1−x) before use so that "left"/"right" issues match the
//! user's own left and right.

use crate::baseline::Baseline;
use crate::config::ThresholdConfig;
use crate::types::{body, FeatureSet, Frame, Landmark};

/// Outcome of extracting features from a frame that passed the
/// landmark-presence check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtractOutcome {
    /// Usable frame; features computed.
    Features(FeatureSet),
    /// Shoulder visibility below the confidence floor — the tick must be
    /// skipped entirely (sensor noise, not absence).
    LowVisibility,
}

/// Body-offset reference when the shoulder-x baseline has not locked yet:
/// assume the user is centered in the capture frame.
const UNCALIBRATED_CENTER_X: f64 = 0.5;

/// Compute the feature set for one frame.
///
/// The caller must have verified [`Frame::has_required_body`]; landmark
/// indexing here relies on it.
pub fn extract(
    frame: &Frame,
    baseline: &Baseline,
    thresholds: &ThresholdConfig,
    mirror: bool,
) -> ExtractOutcome {
    let left_shoulder = frame.body[body::LEFT_SHOULDER];
    let right_shoulder = frame.body[body::RIGHT_SHOULDER];

    let shoulder_visibility = left_shoulder.visibility.min(right_shoulder.visibility);
    if shoulder_visibility < thresholds.min_shoulder_visibility {
        return ExtractOutcome::LowVisibility;
    }

    let nose = frame.body[body::NOSE];
    let left_eye = frame.body[body::LEFT_EYE];
    let right_eye = frame.body[body::RIGHT_EYE];
    let left_ear = frame.body[body::LEFT_EAR];
    let right_ear = frame.body[body::RIGHT_EAR];

    let roll_deg = ear_line_roll(left_ear, right_ear, mirror);
    let head_pitch = nose.y - (left_eye.y + right_eye.y) / 2.0;

    let shoulder_dy = (left_shoulder.y - right_shoulder.y).abs();
    let shoulder_dz = (left_shoulder.z - right_shoulder.z).abs();

    let shoulder_mid_x = (mx(left_shoulder, mirror) + mx(right_shoulder, mirror)) / 2.0;
    let shoulder_mid_y = (left_shoulder.y + right_shoulder.y) / 2.0;
    let shoulder_mid_z = (left_shoulder.z + right_shoulder.z) / 2.0;

    let forward_head = (shoulder_mid_z - nose.z) > thresholds.forward_head_dz;

    let neck_len = shoulder_mid_y - nose.y;
    let slouch = match baseline.neck_len {
        Some(idle) => neck_len < idle * thresholds.slouch_neck_ratio,
        None => neck_len < thresholds.min_neck_len,
    };

    let body_offset_x = shoulder_mid_x - baseline.shoulder_x.unwrap_or(UNCALIBRATED_CENTER_X);

    let face_area = frame.face.as_deref().map_or(0.0, face_bbox_area);
    let face_area_ratio = match (baseline.face_area, face_area) {
        (Some(idle), area) if idle > 0.0 && area > 0.0 => Some(area / idle),
        _ => None,
    };

    ExtractOutcome::Features(FeatureSet {
        roll_deg,
        head_pitch,
        shoulder_dy,
        shoulder_dz,
        shoulder_mid_x,
        body_offset_x,
        neck_len,
        forward_head,
        slouch,
        face_area,
        face_area_ratio,
    })
}

/// Mirrored x coordinate.
fn mx(lm: Landmark, mirror: bool) -> f64 {
    if mirror {
        1.0 - lm.x
    } else {
        lm.x
    }
}

/// Angle of the ear-to-ear line, in degrees, normalized into (−90, 90].
///
/// Positive = the right ear sits lower than the left (y grows downward),
/// i.e. the head is tilted toward the user's right.
fn ear_line_roll(left_ear: Landmark, right_ear: Landmark, mirror: bool) -> f64 {
    let dx = mx(right_ear, mirror) - mx(left_ear, mirror);
    let dy = right_ear.y - left_ear.y;
    let mut deg = dy.atan2(dx).to_degrees();
    // The ear line is an undirected axis: fold into (−90, 90].
    while deg > 90.0 {
        deg -= 180.0;
    }
    while deg <= -90.0 {
        deg += 180.0;
    }
    deg
}

/// Bounding-box area of a face keypoint set; 0.0 for an empty set.
fn face_bbox_area(face: &[Landmark]) -> f64 {
    let mut min_x = f64::MAX;
    let mut max_x = f64::MIN;
    let mut min_y = f64::MAX;
    let mut max_y = f64::MIN;
    if face.is_empty() {
        return 0.0;
    }
    for lm in face {
        min_x = min_x.min(lm.x);
        max_x = max_x.max(lm.x);
        min_y = min_y.min(lm.y);
        max_y = max_y.max(lm.y);
    }
    (max_x - min_x) * (max_y - min_y)
}

// ============================================================================
// Tests
// ============================================================================
