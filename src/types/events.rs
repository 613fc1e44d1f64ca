//! Events emitted by the engine.
//!
//! The event set is closed: `posture_alert`, `distance_alert`, `person_lost`,
//! `coach_reminder`. Each carries the engine-clock timestamp of the tick that
//! produced it. Events are immutable once emitted — ownership passes to the
//! sink, and the engine never retries delivery.

use serde::{Deserialize, Serialize};

use super::{FeatureSet, Issue};

/// Payload of a coaching reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachReminderEvent {
    /// Active issues at emission time, in priority order.
    pub states: Vec<Issue>,
    /// Primary issue at emission time.
    pub primary: Issue,
    /// Configured window length (ms).
    pub window_ms: u64,
    /// Time spent with no active bad issue this window (ms).
    pub good_ms: u64,
    /// Time spent with at least one active bad issue this window (ms).
    pub bad_ms: u64,
    /// The bad issue that dominated this window (or triggered immediately).
    pub top_bad: Option<Issue>,
    /// Feature snapshot from the triggering tick.
    pub features: FeatureSet,
}

/// One emitted engine event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A non-distance issue survived debouncing and became active.
    PostureAlert {
        timestamp_ms: u64,
        issue: Issue,
        features: FeatureSet,
    },
    /// A distance issue (too close / too far) became active.
    DistanceAlert {
        timestamp_ms: u64,
        issue: Issue,
        features: FeatureSet,
    },
    /// The person left the frame (emitted once per present→absent transition).
    PersonLost { timestamp_ms: u64 },
    /// The coaching aggregator decided a reminder is due.
    CoachReminder {
        timestamp_ms: u64,
        #[serde(flatten)]
        reminder: CoachReminderEvent,
    },
}

impl EngineEvent {
    pub fn timestamp_ms(&self) -> u64 {
        match self {
            EngineEvent::PostureAlert { timestamp_ms, .. }
            | EngineEvent::DistanceAlert { timestamp_ms, .. }
            | EngineEvent::PersonLost { timestamp_ms }
            | EngineEvent::CoachReminder { timestamp_ms, .. } => *timestamp_ms,
        }
    }

    /// Wire-format tag, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineEvent::PostureAlert { .. } => "posture_alert",
            EngineEvent::DistanceAlert { .. } => "distance_alert",
            EngineEvent::PersonLost { .. } => "person_lost",
            EngineEvent::CoachReminder { .. } => "coach_reminder",
        }
    }
}
