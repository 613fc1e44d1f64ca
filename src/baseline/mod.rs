//! Baseline Calibration — personal idle-posture learning
//!
//! Instead of judging every user against fixed absolute geometry, the engine
//! learns each user's idle posture during the first frames of a session and
//! normalizes later thresholds against it.
//!
//! Three components calibrate independently, each from its own fixed-size
//! sample buffer:
//!
//! - `shoulder_x`: idle shoulder-midpoint x (body-lean reference)
//! - `neck_len`: idle nose-to-shoulder distance (slouch reference)
//! - `face_area`: idle face bounding-box area (distance reference; only
//!   accumulates on frames that carried a face result)
//!
//! Once a component's buffer reaches capacity, the component locks to the
//! arithmetic mean of the buffer and is never recomputed within the session.
//! It resets only on engine stop/restart. Before a component locks, the
//! thresholds that depend on it use documented hard-coded fallbacks.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ============================================================================
// Baseline
// ============================================================================

/// Calibrated idle-posture measurements.
///
/// `None` means the component has not locked yet. Mutated only by the
/// [`Calibrator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// Idle shoulder-midpoint x (normalized units).
    pub shoulder_x: Option<f64>,
    /// Idle neck length, shoulder_mid.y − nose.y (normalized units).
    pub neck_len: Option<f64>,
    /// Idle face bounding-box area (normalized units squared).
    pub face_area: Option<f64>,
}

impl Baseline {
    /// Whether every component has locked.
    pub fn is_complete(&self) -> bool {
        self.shoulder_x.is_some() && self.neck_len.is_some() && self.face_area.is_some()
    }
}

// ============================================================================
// Sample Buffer
// ============================================================================

/// Fixed-capacity sample accumulator for one baseline component.
///
/// Non-finite values (NaN, infinity) are rejected so a single bad detector
/// frame cannot poison the mean.
#[derive(Debug, Clone)]
struct SampleBuffer {
    values: Vec<f64>,
    capacity: usize,
}

impl SampleBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a sample. Returns the locked mean once the buffer reaches
    /// capacity, `None` while still accumulating.
    fn push(&mut self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        self.values.push(value);
        if self.values.len() < self.capacity {
            return None;
        }
        let mean = self.values.iter().sum::<f64>() / self.values.len() as f64;
        // The buffer is no longer consulted after lock; release it.
        self.values = Vec::new();
        Some(mean)
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

// ============================================================================
// Calibrator
// ============================================================================

/// Per-component calibration progress, for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComponentStatus {
    Learning { collected: usize, needed: usize },
    Locked,
}

/// Accumulates early-session samples into a [`Baseline`].
///
/// Construction = reset: a fresh calibrator has empty buffers and an unset
/// baseline.
#[derive(Debug, Clone)]
pub struct Calibrator {
    shoulder_x: SampleBuffer,
    neck_len: SampleBuffer,
    face_area: SampleBuffer,
    baseline: Baseline,
}

impl Calibrator {
    pub fn new(samples: usize) -> Self {
        Self {
            shoulder_x: SampleBuffer::new(samples),
            neck_len: SampleBuffer::new(samples),
            face_area: SampleBuffer::new(samples),
            baseline: Baseline::default(),
        }
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// Feed one usable frame's measurements.
    ///
    /// Body components accumulate from every usable frame; the face-area
    /// component only when this frame carried a face result with non-zero
    /// area. Components that already locked ignore further samples.
    pub fn ingest(&mut self, shoulder_mid_x: f64, neck_len: f64, face_area: Option<f64>) {
        if self.baseline.shoulder_x.is_none() {
            if let Some(mean) = self.shoulder_x.push(shoulder_mid_x) {
                info!(component = "shoulder_x", mean, "Baseline component locked");
                self.baseline.shoulder_x = Some(mean);
            }
        }
        if self.baseline.neck_len.is_none() {
            if let Some(mean) = self.neck_len.push(neck_len) {
                info!(component = "neck_len", mean, "Baseline component locked");
                self.baseline.neck_len = Some(mean);
            }
        }
        if self.baseline.face_area.is_none() {
            if let Some(area) = face_area.filter(|a| *a > 0.0) {
                if let Some(mean) = self.face_area.push(area) {
                    info!(component = "face_area", mean, "Baseline component locked");
                    self.baseline.face_area = Some(mean);
                } else {
                    debug!(
                        collected = self.face_area.len(),
                        "Face-area calibration sample accepted"
                    );
                }
            }
        }
    }

    pub fn shoulder_x_status(&self) -> ComponentStatus {
        Self::status(self.baseline.shoulder_x, &self.shoulder_x)
    }

    pub fn neck_len_status(&self) -> ComponentStatus {
        Self::status(self.baseline.neck_len, &self.neck_len)
    }

    pub fn face_area_status(&self) -> ComponentStatus {
        Self::status(self.baseline.face_area, &self.face_area)
    }

    fn status(locked: Option<f64>, buffer: &SampleBuffer) -> ComponentStatus {
        if locked.is_some() {
            ComponentStatus::Locked
        } else {
            ComponentStatus::Learning {
                collected: buffer.len(),
                needed: buffer.capacity,
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_locks_to_mean_at_capacity() {
        let mut cal = Calibrator::new(4);
        for v in [0.4, 0.5, 0.6, 0.5] {
            cal.ingest(v, 0.25, None);
        }
        assert_eq!(cal.baseline().shoulder_x, Some(0.5));
        assert_eq!(cal.baseline().neck_len, Some(0.25));
        assert_eq!(cal.shoulder_x_status(), ComponentStatus::Locked);
    }

    #[test]
    fn locked_component_ignores_further_samples() {
        let mut cal = Calibrator::new(2);
        cal.ingest(0.4, 0.2, None);
        cal.ingest(0.6, 0.2, None);
        assert_eq!(cal.baseline().shoulder_x, Some(0.5));

        // Wildly different later samples must not move the locked mean.
        cal.ingest(0.9, 0.9, None);
        cal.ingest(0.9, 0.9, None);
        assert_eq!(cal.baseline().shoulder_x, Some(0.5));
        assert_eq!(cal.baseline().neck_len, Some(0.2));
    }

    #[test]
    fn face_area_calibrates_independently_of_body() {
        let mut cal = Calibrator::new(3);
        // Three body-only frames: body components lock, face does not.
        for _ in 0..3 {
            cal.ingest(0.5, 0.25, None);
        }
        assert!(cal.baseline().shoulder_x.is_some());
        assert!(cal.baseline().face_area.is_none());
        assert_eq!(
            cal.face_area_status(),
            ComponentStatus::Learning {
                collected: 0,
                needed: 3
            }
        );

        // Face frames arrive later at their own pace.
        for _ in 0..3 {
            cal.ingest(0.5, 0.25, Some(0.012));
        }
        assert_eq!(cal.baseline().face_area, Some(0.012));
        assert!(cal.baseline().is_complete());
    }

    #[test]
    fn zero_area_face_frames_are_not_samples() {
        let mut cal = Calibrator::new(2);
        cal.ingest(0.5, 0.25, Some(0.0));
        cal.ingest(0.5, 0.25, Some(0.0));
        assert!(cal.baseline().face_area.is_none());
    }

    #[test]
    fn non_finite_samples_are_rejected() {
        let mut cal = Calibrator::new(2);
        cal.ingest(f64::NAN, f64::INFINITY, Some(f64::NAN));
        cal.ingest(0.4, 0.2, None);
        cal.ingest(0.6, 0.3, None);
        assert_eq!(cal.baseline().shoulder_x, Some(0.5));
        assert_eq!(cal.baseline().neck_len, Some(0.25));
    }
}
