//! Landmark frame types — the wire format consumed by the engine.
//!
//! Frames carry normalized body keypoints (BlazePose indexing) and an
//! optional face keypoint set. Coordinates are normalized to [0,1] with the
//! origin at the top-left of the capture frame, so y grows downward.

use serde::{Deserialize, Serialize};

/// Anatomical indices into [`Frame::body`] (BlazePose upper-body subset).
pub mod body {
    pub const NOSE: usize = 0;
    pub const LEFT_EYE: usize = 2;
    pub const RIGHT_EYE: usize = 5;
    pub const LEFT_EAR: usize = 7;
    pub const RIGHT_EAR: usize = 8;
    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;

    /// A frame must carry at least this many body landmarks to be usable
    /// (everything up to and including the shoulder pair).
    pub const MIN_LANDMARKS: usize = RIGHT_SHOULDER + 1;
}

/// One normalized keypoint.
///
/// `z` is a signed depth relative to the body mid-plane (negative = toward
/// the camera); `visibility` is the detector's confidence that the point is
/// actually in frame. Both default when the producer omits them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default = "default_visibility")]
    pub visibility: f64,
}

fn default_visibility() -> f64 {
    1.0
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility: 1.0,
        }
    }
}

impl Default for Landmark {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// One processing tick's worth of landmarks.
///
/// Produced once per tick by a landmark source, consumed by the pipeline,
/// then discarded. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Source-side capture timestamp (milliseconds, source-relative).
    pub timestamp_ms: u64,
    /// Body keypoints, indexed by the [`body`] constants.
    pub body: Vec<Landmark>,
    /// Face keypoints, when a face detector result accompanied this frame.
    #[serde(default)]
    pub face: Option<Vec<Landmark>>,
}

impl Frame {
    /// Whether the frame carries enough body landmarks to run the pipeline.
    ///
    /// A frame that fails this check is treated as "no person present", not
    /// as an error.
    pub fn has_required_body(&self) -> bool {
        self.body.len() >= body::MIN_LANDMARKS
    }
}
