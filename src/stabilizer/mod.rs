//! Stabilizer — hysteresis debounce over the candidate issue stream
//!
//! Per-frame candidates are noisy: a single jittery frame can flag a tilt
//! that is gone the next frame. Each issue therefore runs an independent
//! state machine:
//!
//! ```text
//! inactive → pending → active → clearing → inactive
//! ```
//!
//! An issue must be present continuously for `persist_ms` before it
//! activates, and absent for `clear_ms` before it deactivates. The asymmetry
//! (450 ms to trigger, 650 ms to clear) prevents flicker from momentary pose
//! noise while still surfacing sustained problems promptly. A pending issue
//! that disappears drops straight back to inactive — no partial credit.
//!
//! State lives in a fixed arena indexed by the closed issue enumeration, so
//! reset is a single pass and lookups never hash.

use serde::Serialize;
use tracing::debug;

use crate::config::DebounceConfig;
use crate::types::{Issue, IssueSet};

/// Debounce bookkeeping for one issue.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct IssueDebounceState {
    /// When the current unbroken candidate run started.
    pub since: Option<u64>,
    /// Last tick this issue appeared in the candidate set.
    pub last_seen: u64,
    /// Whether the issue has survived debouncing.
    pub active: bool,
}

/// Result of one stabilizer update.
#[derive(Debug, Clone, Copy, Default)]
pub struct StabilizerUpdate {
    /// Issues currently active, in priority order.
    pub active: IssueSet,
    /// Issues that transitioned inactive → active on this tick.
    pub activated: IssueSet,
}

/// Per-issue hysteresis debouncer and primary-issue selector.
#[derive(Debug, Clone)]
pub struct Stabilizer {
    slots: [IssueDebounceState; Issue::BAD_COUNT],
    persist_ms: u64,
    clear_ms: u64,
}

impl Stabilizer {
    pub fn new(config: &DebounceConfig) -> Self {
        Self {
            slots: [IssueDebounceState::default(); Issue::BAD_COUNT],
            persist_ms: config.persist_ms,
            clear_ms: config.clear_ms,
        }
    }

    /// Advance every issue's state machine by one tick.
    pub fn update(&mut self, candidates: IssueSet, now_ms: u64) -> StabilizerUpdate {
        let mut activated = IssueSet::default();

        for (slot_idx, issue) in Issue::PRIORITY.into_iter().enumerate() {
            let slot = &mut self.slots[slot_idx];

            if candidates.contains(issue) {
                slot.last_seen = now_ms;
                let since = *slot.since.get_or_insert(now_ms);
                if !slot.active && now_ms.saturating_sub(since) >= self.persist_ms {
                    slot.active = true;
                    activated.insert(issue);
                    debug!(%issue, held_ms = now_ms - since, "Issue activated");
                }
            } else if slot.active {
                if now_ms.saturating_sub(slot.last_seen) >= self.clear_ms {
                    slot.active = false;
                    slot.since = None;
                    debug!(%issue, "Issue cleared");
                }
            } else {
                // Pending run broken before persist elapsed: no partial credit.
                slot.since = None;
            }
        }

        StabilizerUpdate {
            active: self.active_set(),
            activated,
        }
    }

    /// Issues currently active, in priority order.
    pub fn active_set(&self) -> IssueSet {
        Issue::PRIORITY
            .into_iter()
            .enumerate()
            .filter(|(idx, _)| self.slots[*idx].active)
            .map(|(_, issue)| issue)
            .collect()
    }

    /// Highest-priority active issue, or `None` when posture is clean.
    pub fn primary(&self) -> Option<Issue> {
        self.active_set().first()
    }

    /// Debounce snapshot for one issue (status surfaces, tests).
    pub fn state_of(&self, issue: Issue) -> Option<IssueDebounceState> {
        issue.slot().map(|idx| self.slots[idx])
    }

    /// Drop all debounce state (person lost, session reset).
    pub fn reset(&mut self) {
        self.slots = [IssueDebounceState::default(); Issue::BAD_COUNT];
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stabilizer() -> Stabilizer {
        Stabilizer::new(&DebounceConfig::default())
    }

    fn only(issue: Issue) -> IssueSet {
        let mut set = IssueSet::default();
        set.insert(issue);
        set
    }

    #[test]
    fn short_presence_never_activates() {
        let mut s = stabilizer();
        // 440 ms of continuous presence at ~60 Hz ticks, then gone.
        for t in (0..=440).step_by(20) {
            let update = s.update(only(Issue::HeadDown), t);
            assert!(update.active.is_empty(), "active at t={t}");
        }
        let update = s.update(IssueSet::EMPTY, 460);
        assert!(update.active.is_empty());
        assert_eq!(s.state_of(Issue::HeadDown).unwrap().since, None);
    }

    #[test]
    fn activates_exactly_at_persist_crossing() {
        let mut s = stabilizer();
        for t in (0..450).step_by(50) {
            let update = s.update(only(Issue::HeadDown), t);
            assert!(update.activated.is_empty(), "early activation at t={t}");
        }
        let update = s.update(only(Issue::HeadDown), 450);
        assert!(update.activated.contains(Issue::HeadDown));
        assert_eq!(update.active.to_vec(), vec![Issue::HeadDown]);

        // Already-active issues do not re-report activation.
        let update = s.update(only(Issue::HeadDown), 500);
        assert!(update.activated.is_empty());
        assert!(update.active.contains(Issue::HeadDown));
    }

    #[test]
    fn clear_asymmetry_survives_short_gaps() {
        let mut s = stabilizer();
        for t in (0..=450).step_by(50) {
            s.update(only(Issue::TooClose), t);
        }
        assert!(s.primary().is_some());

        // Absent for 600 ms — still within the 650 ms clear horizon.
        let update = s.update(IssueSet::EMPTY, 1050);
        assert!(update.active.contains(Issue::TooClose));

        // Reappears: clear timer resets without ever leaving active.
        let update = s.update(only(Issue::TooClose), 1100);
        assert!(update.active.contains(Issue::TooClose));
        assert!(update.activated.is_empty());

        // Another 600 ms absence measured from the new last_seen: still active.
        let update = s.update(IssueSet::EMPTY, 1700);
        assert!(update.active.contains(Issue::TooClose));

        // 650 ms after last sighting: cleared.
        let update = s.update(IssueSet::EMPTY, 1750);
        assert!(!update.active.contains(Issue::TooClose));
        assert_eq!(s.state_of(Issue::TooClose).unwrap().since, None);
    }

    #[test]
    fn pending_drop_requires_full_repersist() {
        let mut s = stabilizer();
        s.update(only(Issue::BodyLeanLeft), 0);
        s.update(only(Issue::BodyLeanLeft), 300);
        // Gone for one tick while still pending: run is forfeited.
        s.update(IssueSet::EMPTY, 320);
        // Back again; must hold a fresh 450 ms.
        s.update(only(Issue::BodyLeanLeft), 340);
        let update = s.update(only(Issue::BodyLeanLeft), 700);
        assert!(update.active.is_empty());
        let update = s.update(only(Issue::BodyLeanLeft), 790);
        assert!(update.active.contains(Issue::BodyLeanLeft));
    }

    #[test]
    fn issues_debounce_independently() {
        let mut s = stabilizer();
        let both: IssueSet = [Issue::HeadDown, Issue::ShouldersUnlevel]
            .into_iter()
            .collect();
        for t in (0..=200).step_by(50) {
            s.update(both, t);
        }
        // ShouldersUnlevel drops out; HeadDown keeps its run.
        for t in (250..=500).step_by(50) {
            s.update(only(Issue::HeadDown), t);
        }
        assert_eq!(s.active_set().to_vec(), vec![Issue::HeadDown]);
    }

    #[test]
    fn primary_follows_priority_order() {
        let mut s = stabilizer();
        let set: IssueSet = [Issue::ShouldersUnlevel, Issue::HeadDown]
            .into_iter()
            .collect();
        for t in (0..=450).step_by(50) {
            s.update(set, t);
        }
        assert_eq!(s.primary(), Some(Issue::HeadDown));
        assert_eq!(
            s.active_set().to_vec(),
            vec![Issue::HeadDown, Issue::ShouldersUnlevel]
        );
    }

    #[test]
    fn reset_clears_every_slot() {
        let mut s = stabilizer();
        for t in (0..=450).step_by(50) {
            s.update(only(Issue::TooFar), t);
        }
        assert!(s.primary().is_some());
        s.reset();
        assert_eq!(s.primary(), None);
        assert!(s.active_set().is_empty());
        assert_eq!(s.state_of(Issue::TooFar).unwrap().last_seen, 0);
    }
}
