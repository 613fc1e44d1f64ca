//! Engine status and per-tick pipeline state.
//!
//! All mutable pipeline state lives in one explicit [`EngineState`] struct
//! owned by the controller's single logical thread of execution.
//! Construction = reset: dropping the old value and building a new one is
//! the whole lifecycle story, which keeps stop/restart auditable and lets
//! tests drive the pipeline without a live landmark source.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::baseline::{Baseline, Calibrator};
use crate::classify::classify;
use crate::coaching::CoachingAggregator;
use crate::config::EngineConfig;
use crate::features::{extract, ExtractOutcome};
use crate::stabilizer::Stabilizer;
use crate::types::{EngineEvent, FeatureSet, Frame, Issue, IssueSet};

// ============================================================================
// Engine Status
// ============================================================================

/// Lifecycle state of the engine controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineStatus {
    /// Constructed, no source acquired.
    Idle,
    /// Ticking.
    Running,
    /// Frame processing suspended; all state frozen in place.
    Paused,
    /// Source released, state reset. Terminal until the next `start()`.
    Stopped,
}

impl std::fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineStatus::Idle => write!(f, "Idle"),
            EngineStatus::Running => write!(f, "Running"),
            EngineStatus::Paused => write!(f, "Paused"),
            EngineStatus::Stopped => write!(f, "Stopped"),
        }
    }
}

// ============================================================================
// Engine Statistics
// ============================================================================

/// Counters for the session, surfaced at shutdown and by status queries.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EngineStats {
    pub ticks_processed: u64,
    pub frames_skipped_low_visibility: u64,
    pub alerts_emitted: u64,
    pub reminders_emitted: u64,
    pub person_lost_transitions: u64,
}

// ============================================================================
// Engine State
// ============================================================================

/// The complete mutable state of the per-tick pipeline.
#[derive(Debug, Clone)]
pub struct EngineState {
    calibrator: Calibrator,
    stabilizer: Stabilizer,
    coaching: CoachingAggregator,
    thresholds: crate::config::ThresholdConfig,
    mirror: bool,
    /// Whether the last processed tick saw a person.
    person_present: bool,
    primary: Issue,
    last_features: Option<FeatureSet>,
    stats: EngineStats,
}

impl EngineState {
    /// Build the initial (fully reset) state for a session.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            calibrator: Calibrator::new(config.calibration.samples),
            stabilizer: Stabilizer::new(&config.debounce),
            coaching: CoachingAggregator::new(&config.coaching),
            thresholds: config.thresholds.clone(),
            mirror: config.engine.mirror,
            person_present: false,
            primary: Issue::NoPerson,
            last_features: None,
            stats: EngineStats::default(),
        }
    }

    /// Run one pipeline pass.
    ///
    /// `frame = None` (or a frame without the required landmarks) means no
    /// person is visible this tick. Returns the events to emit, in order.
    pub fn process_tick(&mut self, frame: Option<&Frame>, now_ms: u64) -> Vec<EngineEvent> {
        self.stats.ticks_processed += 1;

        let Some(frame) = frame.filter(|f| f.has_required_body()) else {
            return self.handle_person_lost(now_ms);
        };

        let features = match extract(frame, self.calibrator.baseline(), &self.thresholds, self.mirror)
        {
            ExtractOutcome::Features(f) => f,
            ExtractOutcome::LowVisibility => {
                // Sensor noise, not absence: skip the tick without touching
                // any pipeline state.
                self.stats.frames_skipped_low_visibility += 1;
                debug!(t = now_ms, "Frame skipped (low shoulder visibility)");
                return Vec::new();
            }
        };

        if !self.person_present {
            self.person_present = true;
            debug!(t = now_ms, "Person acquired");
        }

        self.calibrator.ingest(
            features.shoulder_mid_x,
            features.neck_len,
            (features.face_area > 0.0).then_some(features.face_area),
        );

        let candidates = classify(&features, &self.thresholds);
        let update = self.stabilizer.update(candidates, now_ms);
        self.primary = self.stabilizer.primary().unwrap_or(Issue::Good);

        let mut events = Vec::new();
        for issue in update.activated.iter() {
            self.stats.alerts_emitted += 1;
            events.push(if issue.is_distance() {
                EngineEvent::DistanceAlert {
                    timestamp_ms: now_ms,
                    issue,
                    features,
                }
            } else {
                EngineEvent::PostureAlert {
                    timestamp_ms: now_ms,
                    issue,
                    features,
                }
            });
        }

        if let Some(reminder) = self
            .coaching
            .tick(update.active, self.primary, &features, now_ms)
        {
            self.stats.reminders_emitted += 1;
            events.push(EngineEvent::CoachReminder {
                timestamp_ms: now_ms,
                reminder,
            });
        }

        self.last_features = Some(features);
        events
    }

    /// No person this tick: force the neutral state and report the
    /// transition exactly once.
    fn handle_person_lost(&mut self, now_ms: u64) -> Vec<EngineEvent> {
        self.primary = Issue::NoPerson;
        if !self.person_present {
            return Vec::new();
        }
        self.person_present = false;
        self.stats.person_lost_transitions += 1;
        // Active issues cannot outlive the person; they re-earn activation
        // on return. Absence time counts toward neither good nor bad.
        self.stabilizer.reset();
        self.coaching.mark_interrupted();
        debug!(t = now_ms, "Person lost");
        vec![EngineEvent::PersonLost {
            timestamp_ms: now_ms,
        }]
    }

    /// The single primary issue for display.
    pub fn primary(&self) -> Issue {
        self.primary
    }

    /// Currently active issues, in priority order.
    pub fn active_issues(&self) -> IssueSet {
        self.stabilizer.active_set()
    }

    pub fn baseline(&self) -> &Baseline {
        self.calibrator.baseline()
    }

    pub fn last_features(&self) -> Option<&FeatureSet> {
        self.last_features.as_ref()
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{body, Landmark};

    fn upright_frame(ts: u64) -> Frame {
        let mut lm = vec![Landmark::new(0.0, 0.0); body::MIN_LANDMARKS];
        lm[body::NOSE] = Landmark::new(0.5, 0.30);
        lm[body::LEFT_EYE] = Landmark::new(0.47, 0.27);
        lm[body::RIGHT_EYE] = Landmark::new(0.53, 0.27);
        lm[body::LEFT_EAR] = Landmark::new(0.44, 0.30);
        lm[body::RIGHT_EAR] = Landmark::new(0.56, 0.30);
        lm[body::LEFT_SHOULDER] = Landmark::new(0.38, 0.55);
        lm[body::RIGHT_SHOULDER] = Landmark::new(0.62, 0.55);
        Frame {
            timestamp_ms: ts,
            body: lm,
            face: None,
        }
    }

    fn tilted_frame(ts: u64) -> Frame {
        let mut frame = upright_frame(ts);
        frame.body[body::RIGHT_EAR].y = 0.36;
        frame
    }

    #[test]
    fn fresh_state_is_neutral() {
        let state = EngineState::new(&EngineConfig::default());
        assert_eq!(state.primary(), Issue::NoPerson);
        assert!(state.active_issues().is_empty());
        assert_eq!(state.baseline().shoulder_x, None);
        assert_eq!(state.stats().ticks_processed, 0);
    }

    #[test]
    fn sustained_tilt_activates_and_alerts_once() {
        let mut state = EngineState::new(&EngineConfig::default());
        let mut alerts = 0;
        for t in (0..=900).step_by(100) {
            let frame = tilted_frame(t);
            for event in state.process_tick(Some(&frame), t) {
                if matches!(event, EngineEvent::PostureAlert { .. }) {
                    alerts += 1;
                }
            }
        }
        assert_eq!(alerts, 1);
        assert_eq!(state.primary(), Issue::HeadTiltRight);
    }

    #[test]
    fn good_posture_yields_good_primary() {
        let mut state = EngineState::new(&EngineConfig::default());
        for t in (0..=600).step_by(100) {
            let frame = upright_frame(t);
            let events = state.process_tick(Some(&frame), t);
            assert!(events.is_empty());
        }
        assert_eq!(state.primary(), Issue::Good);
    }

    #[test]
    fn person_lost_emits_once_per_transition() {
        let mut state = EngineState::new(&EngineConfig::default());

        // Absent from the start: no transition, no event.
        assert!(state.process_tick(None, 0).is_empty());
        assert_eq!(state.primary(), Issue::NoPerson);

        let frame = upright_frame(100);
        state.process_tick(Some(&frame), 100);
        assert_eq!(state.primary(), Issue::Good);

        let events = state.process_tick(None, 200);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], EngineEvent::PersonLost { .. }));
        assert_eq!(state.primary(), Issue::NoPerson);

        // Still absent: no further events.
        assert!(state.process_tick(None, 300).is_empty());
        assert!(state.process_tick(None, 400).is_empty());
        assert_eq!(state.stats().person_lost_transitions, 1);
    }

    #[test]
    fn person_lost_clears_active_issues() {
        let mut state = EngineState::new(&EngineConfig::default());
        for t in (0..=600).step_by(100) {
            let frame = tilted_frame(t);
            state.process_tick(Some(&frame), t);
        }
        assert!(!state.active_issues().is_empty());

        state.process_tick(None, 700);
        assert!(state.active_issues().is_empty());

        // Back in frame tilted: must re-earn the full persist window.
        let events = state.process_tick(Some(&tilted_frame(800)), 800);
        assert!(events.is_empty());
        assert_eq!(state.primary(), Issue::Good);
    }

    #[test]
    fn low_visibility_tick_freezes_everything() {
        let mut state = EngineState::new(&EngineConfig::default());
        for t in (0..=600).step_by(100) {
            state.process_tick(Some(&tilted_frame(t)), t);
        }
        let primary_before = state.primary();

        let mut ghost = tilted_frame(700);
        ghost.body[body::LEFT_SHOULDER].visibility = 0.01;
        let events = state.process_tick(Some(&ghost), 700);
        assert!(events.is_empty());
        assert_eq!(state.primary(), primary_before);
        assert_eq!(state.stats().frames_skipped_low_visibility, 1);
    }

    #[test]
    fn short_frames_count_as_absence() {
        let mut state = EngineState::new(&EngineConfig::default());
        state.process_tick(Some(&upright_frame(0)), 0);

        let stub = Frame {
            timestamp_ms: 100,
            body: vec![Landmark::new(0.5, 0.5); 3],
            face: None,
        };
        let events = state.process_tick(Some(&stub), 100);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], EngineEvent::PersonLost { .. }));
    }

    #[test]
    fn calibration_progresses_from_frames() {
        let config = EngineConfig::default();
        let mut state = EngineState::new(&config);
        for t in 0..config.calibration.samples as u64 {
            state.process_tick(Some(&upright_frame(t)), t * 100);
        }
        let baseline = state.baseline();
        assert!(baseline.shoulder_x.is_some());
        assert!(baseline.neck_len.is_some());
        assert!(baseline.face_area.is_none()); // no face frames fed
    }
}
