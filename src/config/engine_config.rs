//! Engine configuration — all tunable values as TOML-loadable sections.
//!
//! Every threshold the pipeline consults is a field in this module. Each
//! struct implements `Default` with values matching the reference constants
//! in [`defaults`](super::defaults), ensuring zero-change behavior when no
//! config file is present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for an engine deployment.
///
/// Load with [`EngineConfig::load`], which searches:
/// 1. `$POSTURE_COACH_CONFIG` env var
/// 2. `./posture_coach.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Run-loop settings
    #[serde(default)]
    pub engine: EngineSection,

    /// Classification thresholds
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Hysteresis debounce timing
    #[serde(default)]
    pub debounce: DebounceConfig,

    /// Coaching reminder policy
    #[serde(default)]
    pub coaching: CoachingConfig,

    /// Baseline calibration
    #[serde(default)]
    pub calibration: CalibrationConfig,
}

impl EngineConfig {
    /// Load configuration using the standard search order:
    /// 1. `$POSTURE_COACH_CONFIG` environment variable
    /// 2. `./posture_coach.toml` in the current working directory
    /// 3. Built-in defaults (reference constants)
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("POSTURE_COACH_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded engine config from POSTURE_COACH_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from POSTURE_COACH_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "POSTURE_COACH_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from("posture_coach.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded engine config from ./posture_coach.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./posture_coach.toml, using defaults");
                }
            }
        }

        info!("No posture_coach.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

// ============================================================================
// Sections
// ============================================================================

/// Run-loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSection {
    /// Capped processing rate (ticks per second). Excess frames are dropped.
    #[serde(default = "d_target_fps")]
    pub target_fps: u32,

    /// Whether the source preview is mirrored. When true, body x coordinates
    /// are flipped (x ↦ 1−x) so left/right issues match the user's own
    /// left and right.
    #[serde(default)]
    pub mirror: bool,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            target_fps: defaults::TARGET_FPS,
            mirror: false,
        }
    }
}

/// Classification thresholds. See `config/defaults.rs` for units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "d_min_shoulder_visibility")]
    pub min_shoulder_visibility: f64,
    #[serde(default = "d_head_roll_deg")]
    pub head_roll_deg: f64,
    #[serde(default = "d_head_pitch_down")]
    pub head_pitch_down: f64,
    #[serde(default = "d_head_pitch_up")]
    pub head_pitch_up: f64,
    #[serde(default = "d_shoulder_dy")]
    pub shoulder_dy: f64,
    #[serde(default = "d_shoulder_dz")]
    pub shoulder_dz: f64,
    #[serde(default = "d_forward_head_dz")]
    pub forward_head_dz: f64,
    #[serde(default = "d_body_lean_x")]
    pub body_lean_x: f64,
    #[serde(default = "d_too_close_factor")]
    pub too_close_factor: f64,
    #[serde(default = "d_too_far_factor")]
    pub too_far_factor: f64,
    #[serde(default = "d_slouch_neck_ratio")]
    pub slouch_neck_ratio: f64,
    #[serde(default = "d_min_neck_len")]
    pub min_neck_len: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_shoulder_visibility: defaults::MIN_SHOULDER_VISIBILITY,
            head_roll_deg: defaults::HEAD_ROLL_DEG,
            head_pitch_down: defaults::HEAD_PITCH_DOWN,
            head_pitch_up: defaults::HEAD_PITCH_UP,
            shoulder_dy: defaults::SHOULDER_DY,
            shoulder_dz: defaults::SHOULDER_DZ,
            forward_head_dz: defaults::FORWARD_HEAD_DZ,
            body_lean_x: defaults::BODY_LEAN_X,
            too_close_factor: defaults::TOO_CLOSE_FACTOR,
            too_far_factor: defaults::TOO_FAR_FACTOR,
            slouch_neck_ratio: defaults::SLOUCH_NECK_RATIO,
            min_neck_len: defaults::MIN_NECK_LEN,
        }
    }
}

/// Hysteresis debounce timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// Continuous presence required before an issue activates (ms).
    #[serde(default = "d_persist_ms")]
    pub persist_ms: u64,

    /// Absence required before an active issue clears (ms).
    #[serde(default = "d_clear_ms")]
    pub clear_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            persist_ms: defaults::PERSIST_MS,
            clear_ms: defaults::CLEAR_MS,
        }
    }
}

/// Coaching reminder policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachingConfig {
    /// Rolling window length (ms).
    #[serde(default = "d_window_ms")]
    pub window_ms: u64,

    /// Unbroken streak for the immediate trigger (ms).
    #[serde(default = "d_continuous_bad_ms")]
    pub continuous_bad_ms: u64,

    /// Accumulated bad time for the window-end trigger (ms).
    #[serde(default = "d_bad_dominance_ms")]
    pub bad_dominance_ms: u64,

    /// Shared cooldown between reminders (ms).
    #[serde(default = "d_cooldown_ms")]
    pub cooldown_ms: u64,
}

impl Default for CoachingConfig {
    fn default() -> Self {
        Self {
            window_ms: defaults::WINDOW_MS,
            continuous_bad_ms: defaults::CONTINUOUS_BAD_MS,
            bad_dominance_ms: defaults::BAD_DOMINANCE_MS,
            cooldown_ms: defaults::COOLDOWN_MS,
        }
    }
}

/// Baseline calibration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Samples accumulated before a baseline component locks.
    #[serde(default = "d_calibration_samples")]
    pub samples: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            samples: defaults::CALIBRATION_SAMPLES,
        }
    }
}

// serde(default = ...) requires free functions
fn d_target_fps() -> u32 {
    defaults::TARGET_FPS
}
fn d_min_shoulder_visibility() -> f64 {
    defaults::MIN_SHOULDER_VISIBILITY
}
fn d_head_roll_deg() -> f64 {
    defaults::HEAD_ROLL_DEG
}
fn d_head_pitch_down() -> f64 {
    defaults::HEAD_PITCH_DOWN
}
fn d_head_pitch_up() -> f64 {
    defaults::HEAD_PITCH_UP
}
fn d_shoulder_dy() -> f64 {
    defaults::SHOULDER_DY
}
fn d_shoulder_dz() -> f64 {
    defaults::SHOULDER_DZ
}
fn d_forward_head_dz() -> f64 {
    defaults::FORWARD_HEAD_DZ
}
fn d_body_lean_x() -> f64 {
    defaults::BODY_LEAN_X
}
fn d_too_close_factor() -> f64 {
    defaults::TOO_CLOSE_FACTOR
}
fn d_too_far_factor() -> f64 {
    defaults::TOO_FAR_FACTOR
}
fn d_slouch_neck_ratio() -> f64 {
    defaults::SLOUCH_NECK_RATIO
}
fn d_min_neck_len() -> f64 {
    defaults::MIN_NECK_LEN
}
fn d_persist_ms() -> u64 {
    defaults::PERSIST_MS
}
fn d_clear_ms() -> u64 {
    defaults::CLEAR_MS
}
fn d_window_ms() -> u64 {
    defaults::WINDOW_MS
}
fn d_continuous_bad_ms() -> u64 {
    defaults::CONTINUOUS_BAD_MS
}
fn d_bad_dominance_ms() -> u64 {
    defaults::BAD_DOMINANCE_MS
}
fn d_cooldown_ms() -> u64 {
    defaults::COOLDOWN_MS
}
fn d_calibration_samples() -> usize {
    defaults::CALIBRATION_SAMPLES
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_reference_defaults() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config.debounce.persist_ms, 450);
        assert_eq!(config.debounce.clear_ms, 650);
        assert_eq!(config.coaching.window_ms, 120_000);
        assert_eq!(config.coaching.continuous_bad_ms, 120_000);
        assert_eq!(config.coaching.bad_dominance_ms, 90_000);
        assert_eq!(config.coaching.cooldown_ms, 360_000);
        assert_eq!(config.calibration.samples, 60);
        assert_eq!(config.thresholds.head_roll_deg, 12.0);
        assert_eq!(config.thresholds.shoulder_dy, 0.030);
        assert_eq!(config.thresholds.too_close_factor, 1.35);
    }

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let config: EngineConfig = toml::from_str(
            r#"
            [debounce]
            persist_ms = 300

            [engine]
            mirror = true
            "#,
        )
        .unwrap();
        assert_eq!(config.debounce.persist_ms, 300);
        assert_eq!(config.debounce.clear_ms, 650);
        assert!(config.engine.mirror);
        assert_eq!(config.engine.target_fps, defaults::TARGET_FPS);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = EngineConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let back: EngineConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(back.coaching.cooldown_ms, config.coaching.cooldown_ms);
        assert_eq!(
            back.thresholds.slouch_neck_ratio,
            config.thresholds.slouch_neck_ratio
        );
    }
}
