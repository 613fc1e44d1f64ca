//! Per-frame derived features.

use serde::{Deserialize, Serialize};

/// Named scalar/boolean features derived from one frame and the current
/// baseline. A pure function of its inputs — carries no history.
///
/// Snapshots of this struct travel on alert and reminder events, so every
/// field is serializable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Angle of the ear-to-ear line in degrees, normalized into (−90, 90].
    /// Positive = head tilted toward the user's right.
    pub roll_deg: f64,
    /// nose.y − mean(eye.y). Positive = head dropped below the eye line.
    pub head_pitch: f64,
    /// |left − right| shoulder difference on y.
    pub shoulder_dy: f64,
    /// |left − right| shoulder difference on z.
    pub shoulder_dz: f64,
    /// Shoulder-midpoint x (raw, used for lean calibration).
    pub shoulder_mid_x: f64,
    /// shoulder_mid.x − baseline shoulder x (−0.5 when uncalibrated).
    pub body_offset_x: f64,
    /// shoulder_mid.y − nose.y; shrinks when the neck compresses.
    pub neck_len: f64,
    /// (shoulder_mid.z − nose.z) exceeded the forward-head depth threshold.
    pub forward_head: bool,
    /// Neck length fell below the calibrated (or fallback) slouch floor.
    pub slouch: bool,
    /// Bounding-box area of the face keypoints; 0.0 when no face result.
    pub face_area: f64,
    /// face_area / baseline face area, when both are known and non-zero.
    pub face_area_ratio: Option<f64>,
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self {
            roll_deg: 0.0,
            head_pitch: 0.0,
            shoulder_dy: 0.0,
            shoulder_dz: 0.0,
            shoulder_mid_x: 0.5,
            body_offset_x: 0.0,
            neck_len: 0.0,
            forward_head: false,
            slouch: false,
            face_area: 0.0,
            face_area_ratio: None,
        }
    }
}
