//! System-wide default constants.
//!
//! Centralises the reference thresholds in one place. These are empirically
//! chosen demo constants preserved as configuration defaults — every value
//! here backs a `Default` impl in `engine_config.rs`. Grouped by subsystem.

// ============================================================================
// Engine
// ============================================================================

/// Capped processing rate (ticks per second).
///
/// Frames arriving faster than this are dropped, never queued.
pub const TARGET_FPS: u32 = 15;

/// Minimum shoulder visibility confidence for a frame to be usable.
pub const MIN_SHOULDER_VISIBILITY: f64 = 0.05;

// ============================================================================
// Classification Thresholds
// ============================================================================

/// Head-roll magnitude that counts as a tilt (degrees).
pub const HEAD_ROLL_DEG: f64 = 12.0;

/// Head-pitch offset at or above which the head counts as dropped
/// (normalized units, nose.y − mean eye.y).
pub const HEAD_PITCH_DOWN: f64 = 0.10;

/// Head-pitch offset at or below which the head counts as raised.
///
/// The nose sits roughly 0.05 below the eye line at rest, so values near
/// zero mean the chin is up.
pub const HEAD_PITCH_UP: f64 = 0.02;

/// Shoulder y-differential that counts as unlevel (normalized units).
pub const SHOULDER_DY: f64 = 0.030;

/// Shoulder z-differential that counts as depth-misaligned (normalized units).
pub const SHOULDER_DZ: f64 = 0.10;

/// Forward-head depth delta (shoulder_mid.z − nose.z) threshold.
pub const FORWARD_HEAD_DZ: f64 = 0.18;

/// Shoulder-midpoint x offset from baseline that counts as a body lean.
pub const BODY_LEAN_X: f64 = 0.050;

/// Face area ≥ this multiple of the baseline area flags "too close".
pub const TOO_CLOSE_FACTOR: f64 = 1.35;

/// Face area ≤ this multiple of the baseline area flags "too far".
pub const TOO_FAR_FACTOR: f64 = 0.75;

/// Neck length below baseline × this ratio flags the slouch proxy.
pub const SLOUCH_NECK_RATIO: f64 = 0.82;

/// Slouch-proxy hard floor for neck length while uncalibrated
/// (normalized units).
pub const MIN_NECK_LEN: f64 = 0.14;

// ============================================================================
// Debounce
// ============================================================================

/// Continuous candidate presence required before an issue activates (ms).
pub const PERSIST_MS: u64 = 450;

/// Candidate absence required before an active issue clears (ms).
///
/// Longer than [`PERSIST_MS`] so momentary pose noise neither triggers nor
/// un-triggers an issue.
pub const CLEAR_MS: u64 = 650;

// ============================================================================
// Coaching
// ============================================================================

/// Rolling coaching window length (ms). 120 000 = 2 minutes.
pub const WINDOW_MS: u64 = 120_000;

/// Unbroken single-issue streak that triggers an immediate reminder (ms).
pub const CONTINUOUS_BAD_MS: u64 = 120_000;

/// Accumulated bad time within one window that triggers a window-end
/// reminder (ms). 90 000 = 1.5 minutes out of the 2-minute window.
pub const BAD_DOMINANCE_MS: u64 = 90_000;

/// Minimum gap between coaching reminders, shared by both triggers (ms).
/// 360 000 = 6 minutes.
pub const COOLDOWN_MS: u64 = 360_000;

// ============================================================================
// Calibration
// ============================================================================

/// Samples accumulated before a baseline component locks.
pub const CALIBRATION_SAMPLES: usize = 60;
