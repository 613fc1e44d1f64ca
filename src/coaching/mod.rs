//! Coaching Aggregator — windowed reminder policy with shared cooldown
//!
//! Decides *when to say something*. Two independent trigger rules feed one
//! reminder stream:
//!
//! - **Immediate**: a single bad issue has been active without interruption
//!   for `continuous_bad_ms` — catches one sustained bad posture without
//!   waiting for the window to close.
//! - **Window-end**: the closing window accumulated at least
//!   `bad_dominance_ms` of bad time — catches posture that is bad *often*
//!   without any single issue being continuously bad.
//!
//! Both triggers share one cooldown, so the user is never interrupted more
//! than once per `cooldown_ms` regardless of which rule fires.

use tracing::{debug, info};

use crate::config::CoachingConfig;
use crate::types::{CoachReminderEvent, FeatureSet, Issue, IssueSet};

/// Accumulation slots: one per bad issue plus one for "good".
const SLOT_COUNT: usize = Issue::BAD_COUNT + 1;
const GOOD_SLOT: usize = Issue::BAD_COUNT;

/// Rolling-window accumulator state.
///
/// Window counters reset wholesale at rollover; everything resets on session
/// reset. `continuous_ms` tracks the *current unbroken streak* per issue —
/// it drops to zero the instant the issue is not active on a tick.
#[derive(Debug, Clone)]
pub struct CoachingAggregator {
    config: CoachingConfig,
    window_start: Option<u64>,
    good_ms: u64,
    bad_ms: u64,
    per_issue_ms: [u64; SLOT_COUNT],
    continuous_ms: [u64; Issue::BAD_COUNT],
    last_reminder_at: Option<u64>,
    last_tick: Option<u64>,
}

impl CoachingAggregator {
    pub fn new(config: &CoachingConfig) -> Self {
        Self {
            config: config.clone(),
            window_start: None,
            good_ms: 0,
            bad_ms: 0,
            per_issue_ms: [0; SLOT_COUNT],
            continuous_ms: [0; Issue::BAD_COUNT],
            last_reminder_at: None,
            last_tick: None,
        }
    }

    /// Break the tick-to-tick timing chain without touching window counters.
    ///
    /// Called by the controller when the person leaves the frame, so absence
    /// time counts toward neither good nor bad once they return.
    pub fn mark_interrupted(&mut self) {
        self.last_tick = None;
    }

    /// Consume one tick. Returns a reminder when a trigger fires.
    ///
    /// The controller skips this entirely while primary = NoPerson.
    pub fn tick(
        &mut self,
        active: IssueSet,
        primary: Issue,
        features: &FeatureSet,
        now_ms: u64,
    ) -> Option<CoachReminderEvent> {
        let Some(last_tick) = self.last_tick else {
            // First tick after a reset (or an absence) initializes the
            // timers and emits nothing.
            self.last_tick = Some(now_ms);
            self.window_start.get_or_insert(now_ms);
            return None;
        };
        let dt = now_ms.saturating_sub(last_tick);
        self.last_tick = Some(now_ms);
        let window_start = *self.window_start.get_or_insert(now_ms);

        // Accumulate this tick's dt.
        let any_bad = !active.is_empty();
        if any_bad {
            self.bad_ms += dt;
            for issue in active.iter() {
                if let Some(slot) = issue.slot() {
                    self.per_issue_ms[slot] += dt;
                }
            }
        } else {
            self.good_ms += dt;
            self.per_issue_ms[GOOD_SLOT] += dt;
        }

        // Continuous streaks: grow while active, die the instant an issue
        // is absent from the active set.
        for (slot, issue) in Issue::PRIORITY.into_iter().enumerate() {
            if active.contains(issue) {
                self.continuous_ms[slot] += dt;
            } else {
                self.continuous_ms[slot] = 0;
            }
        }

        let cooldown_ok = self
            .last_reminder_at
            .is_none_or(|at| now_ms.saturating_sub(at) >= self.config.cooldown_ms);

        // Immediate trigger — checked first; when it fires, the window-end
        // check is skipped for this tick.
        if cooldown_ok {
            let streak_hit = Issue::PRIORITY.into_iter().enumerate().find(|(slot, issue)| {
                active.contains(*issue) && self.continuous_ms[*slot] >= self.config.continuous_bad_ms
            });
            if let Some((slot, issue)) = streak_hit {
                info!(
                    %issue,
                    streak_ms = self.continuous_ms[slot],
                    "Coach reminder (continuous streak)"
                );
                self.continuous_ms[slot] = 0;
                self.last_reminder_at = Some(now_ms);
                return Some(self.build_reminder(active, primary, Some(issue), features));
            }
        }

        // Window-end trigger — the window rolls whether or not it fires.
        if now_ms.saturating_sub(window_start) >= self.config.window_ms {
            let top_bad = self.top_bad();
            let qualifies = self.bad_ms >= self.config.bad_dominance_ms;
            let reminder = if qualifies && cooldown_ok {
                info!(
                    bad_ms = self.bad_ms,
                    good_ms = self.good_ms,
                    top_bad = top_bad.map(|i| i.to_string()),
                    "Coach reminder (window dominance)"
                );
                self.last_reminder_at = Some(now_ms);
                Some(self.build_reminder(active, primary, top_bad, features))
            } else {
                if qualifies {
                    debug!(bad_ms = self.bad_ms, "Window qualified but cooldown active — suppressed");
                }
                None
            };
            self.roll_window(now_ms);
            return reminder;
        }

        None
    }

    /// Bad issue with the most accumulated time this window.
    fn top_bad(&self) -> Option<Issue> {
        Issue::PRIORITY
            .into_iter()
            .enumerate()
            .filter(|(slot, _)| self.per_issue_ms[*slot] > 0)
            .max_by_key(|(slot, _)| self.per_issue_ms[*slot])
            .map(|(_, issue)| issue)
    }

    fn build_reminder(
        &self,
        active: IssueSet,
        primary: Issue,
        top_bad: Option<Issue>,
        features: &FeatureSet,
    ) -> CoachReminderEvent {
        CoachReminderEvent {
            states: active.to_vec(),
            primary,
            window_ms: self.config.window_ms,
            good_ms: self.good_ms,
            bad_ms: self.bad_ms,
            top_bad,
            features: *features,
        }
    }

    fn roll_window(&mut self, now_ms: u64) {
        self.window_start = Some(now_ms);
        self.good_ms = 0;
        self.bad_ms = 0;
        self.per_issue_ms = [0; SLOT_COUNT];
    }

    /// Accumulated good/bad time in the current window (status surfaces).
    pub fn window_totals(&self) -> (u64, u64) {
        (self.good_ms, self.bad_ms)
    }

    /// Current unbroken streak for one bad issue.
    pub fn continuous_ms(&self, issue: Issue) -> u64 {
        issue.slot().map_or(0, |slot| self.continuous_ms[slot])
    }
}

// ============================================================================
// Tests
// ============================================================================
