//! Landmark Frame Simulation
//!
//! Generates synthetic body/face keypoint frames for testing posture-coach.
//! Walks through posture scenarios:
//! - Upright sitting (calibration-friendly)
//! - Slouching (dropped shoulders, compressed neck)
//! - Head tilt
//! - Leaning too close to the screen
//! - Leaving the frame entirely
//!
//! # Usage
//! ```bash
//! ./simulation --seconds 600 --fps 15 | ./posture-coach --stdin
//! ```

use clap::Parser;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use std::io::{self, Write};

use posture_coach::types::{body, Frame, Landmark};

// ============================================================================
// Reference Pose Constants
// ============================================================================

/// Upright nose position (normalized units).
const NOSE: (f64, f64) = (0.50, 0.30);
/// Upright eye line y.
const EYE_Y: f64 = 0.27;
/// Upright ear line y.
const EAR_Y: f64 = 0.30;
/// Upright shoulder line y.
const SHOULDER_Y: f64 = 0.55;
/// Shoulder half-width.
const SHOULDER_HALF_W: f64 = 0.12;
/// Face bounding-box half-size around the nose.
const FACE_HALF: f64 = 0.06;
/// Per-coordinate Gaussian jitter (std dev, normalized units).
const JITTER_STD: f64 = 0.004;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "posture-simulation")]
#[command(about = "Synthetic landmark frame generator for posture-coach testing")]
#[command(version)]
struct Args {
    /// Simulated session length in seconds
    #[arg(long, default_value = "600")]
    seconds: u64,

    /// Frame rate (frames per second)
    #[arg(long, default_value = "15", value_parser = clap::value_parser!(u32).range(1..=60))]
    fps: u32,

    /// Emit frames as fast as possible instead of pacing in real time
    #[arg(long)]
    no_pacing: bool,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Scenario to simulate: full, upright, slouch, tilt, close, absent
    #[arg(long, default_value = "full")]
    scenario: String,
}

// ============================================================================
// Simulation Phases
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    /// Upright sitting — lets the engine calibrate (0–20%)
    Upright,
    /// Slouching: shoulders rise toward the face, neck compresses (20–45%)
    Slouch,
    /// Head tilted toward the right shoulder (45–60%)
    Tilt,
    /// Leaning in — face grows past the too-close factor (60–80%)
    TooClose,
    /// Away from keyboard (80–90%)
    Absent,
    /// Back upright to wind down (90–100%)
    Recovery,
}

impl Phase {
    fn at(progress: f64) -> Self {
        match progress {
            p if p < 0.20 => Phase::Upright,
            p if p < 0.45 => Phase::Slouch,
            p if p < 0.60 => Phase::Tilt,
            p if p < 0.80 => Phase::TooClose,
            p if p < 0.90 => Phase::Absent,
            _ => Phase::Recovery,
        }
    }

    fn fixed(scenario: &str) -> Option<Self> {
        match scenario {
            "upright" => Some(Phase::Upright),
            "slouch" => Some(Phase::Slouch),
            "tilt" => Some(Phase::Tilt),
            "close" => Some(Phase::TooClose),
            "absent" => Some(Phase::Absent),
            _ => None,
        }
    }
}

// ============================================================================
// Frame Generation
// ============================================================================

struct FrameGenerator {
    rng: StdRng,
    jitter: Normal<f64>,
}

impl FrameGenerator {
    fn new(seed: Option<u64>) -> Result<Self, rand_distr::NormalError> {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            rng,
            jitter: Normal::new(0.0, JITTER_STD)?,
        })
    }

    fn j(&mut self) -> f64 {
        self.jitter.sample(&mut self.rng)
    }

    fn landmark(&mut self, x: f64, y: f64) -> Landmark {
        Landmark {
            x: x + self.j(),
            y: y + self.j(),
            z: self.j(),
            visibility: 0.99,
        }
    }

    /// Build one frame for a phase, or `None` for absence.
    fn frame(&mut self, phase: Phase, timestamp_ms: u64) -> Option<Frame> {
        if phase == Phase::Absent {
            return None;
        }

        // Phase-dependent pose adjustments.
        let (nose_y, eye_y, shoulder_y, ear_dy, face_scale) = match phase {
            Phase::Upright | Phase::Recovery => (NOSE.1, EYE_Y, SHOULDER_Y, 0.0, 1.0),
            // Shoulders creep up toward the head: apparent neck shortens
            // well below the calibrated ratio.
            Phase::Slouch => (NOSE.1 + 0.04, EYE_Y + 0.04, SHOULDER_Y - 0.11, 0.0, 1.0),
            // Right ear drops: ~17° ear-line roll.
            Phase::Tilt => (NOSE.1, EYE_Y, SHOULDER_Y, 0.075, 1.0),
            // Face bbox grows 1.45x linear => ~2.1x area.
            Phase::TooClose => (NOSE.1, EYE_Y, SHOULDER_Y, 0.0, 1.45),
            Phase::Absent => unreachable!(),
        };

        let mut lm = vec![Landmark::default(); body::MIN_LANDMARKS];
        lm[body::NOSE] = self.landmark(NOSE.0, nose_y);
        lm[body::LEFT_EYE] = self.landmark(NOSE.0 - 0.03, eye_y);
        lm[body::RIGHT_EYE] = self.landmark(NOSE.0 + 0.03, eye_y);
        lm[body::LEFT_EAR] = self.landmark(NOSE.0 - 0.06, EAR_Y - ear_dy / 2.0);
        lm[body::RIGHT_EAR] = self.landmark(NOSE.0 + 0.06, EAR_Y + ear_dy / 2.0);
        lm[body::LEFT_SHOULDER] = self.landmark(NOSE.0 - SHOULDER_HALF_W, shoulder_y);
        lm[body::RIGHT_SHOULDER] = self.landmark(NOSE.0 + SHOULDER_HALF_W, shoulder_y);

        let half = FACE_HALF * face_scale;
        let face = vec![
            self.landmark(NOSE.0 - half, nose_y - half),
            self.landmark(NOSE.0 + half, nose_y - half),
            self.landmark(NOSE.0 + half, nose_y + half),
            self.landmark(NOSE.0 - half, nose_y + half),
        ];

        Some(Frame {
            timestamp_ms,
            body: lm,
            face: Some(face),
        })
    }
}

// ============================================================================
// Entry Point
// ============================================================================

fn main() -> io::Result<()> {
    let args = Args::parse();
    let mut generator = FrameGenerator::new(args.seed)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    let total_frames = args.seconds * u64::from(args.fps);
    let frame_interval_ms = 1_000 / u64::from(args.fps);
    let fixed_phase = Phase::fixed(&args.scenario);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    for i in 0..total_frames {
        let timestamp_ms = i * frame_interval_ms;
        let progress = i as f64 / total_frames as f64;
        let phase = fixed_phase.unwrap_or_else(|| Phase::at(progress));

        match generator.frame(phase, timestamp_ms) {
            Some(frame) => {
                let line = serde_json::to_string(&frame)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                writeln!(out, "{line}")?;
            }
            None => writeln!(out, "null")?,
        }

        if !args.no_pacing {
            std::thread::sleep(std::time::Duration::from_millis(frame_interval_ms));
        }
    }

    Ok(())
}
