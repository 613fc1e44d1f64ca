//! posture-coach: real-time posture classification and coaching
//!
//! Turns a live stream of body/face keypoint frames into a debounced set of
//! posture issues, a single primary issue for display, and periodic coaching
//! reminders that avoid spamming the user.
//!
//! ## Architecture
//!
//! - **Feature Extractor**: one raw landmark frame → named measurements
//! - **Calibrator**: first frames of a session → personal idle baseline
//! - **Issue Classifier**: table-driven instantaneous candidate detection
//! - **Stabilizer**: per-issue hysteresis debouncing + primary selection
//! - **Coaching Aggregator**: windowed two-tier reminder policy with cooldown
//! - **Engine Controller**: per-tick orchestration and lifecycle

pub mod baseline;
pub mod classify;
pub mod coaching;
pub mod config;
pub mod features;
pub mod pipeline;
pub mod stabilizer;
pub mod types;

// Re-export configuration
pub use config::EngineConfig;

// Re-export commonly used types
pub use types::{
    CoachReminderEvent, EngineEvent, FeatureSet, Frame, Issue, IssueSet, Landmark,
};

// Re-export pipeline surface
pub use pipeline::{
    ChannelSink, Clock, EngineController, EngineError, EngineState, EngineStats, EngineStatus,
    EventSink, FrameEvent, JsonlFileProvider, JsonlWriterSink, LandmarkSource, ManualClock,
    MonotonicClock, ReplayProvider, SourceProvider, StdinProvider, TracingSink, TickOutcome,
    VecSink,
};

// Re-export component internals used by embedders and tests
pub use baseline::{Baseline, Calibrator};
pub use coaching::CoachingAggregator;
pub use stabilizer::Stabilizer;
