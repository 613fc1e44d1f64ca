//! The closed posture issue set and its priority ordering.
//!
//! Adding an issue is a data change: extend the enum, the `PRIORITY` table,
//! and the classifier rule table. Nothing else needs to know.

use serde::{Deserialize, Serialize};

/// A posture state the classifier can report.
///
/// The first ten variants are "bad" issues; `Good` and `NoPerson` are
/// non-issue states used for the primary display value. The declaration
/// order of the bad variants is their priority order for primary-issue
/// tie-breaking (see [`Issue::PRIORITY`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Issue {
    TooClose,
    TooFar,
    HeadDown,
    HeadUp,
    HeadTiltLeft,
    HeadTiltRight,
    ShouldersUnlevel,
    ShouldersDepthMisaligned,
    BodyLeanLeft,
    BodyLeanRight,
    Good,
    NoPerson,
}

impl Issue {
    /// Number of bad (debounced) issues.
    pub const BAD_COUNT: usize = 10;

    /// Bad issues in priority order — first active wins primary selection.
    pub const PRIORITY: [Issue; Issue::BAD_COUNT] = [
        Issue::TooClose,
        Issue::TooFar,
        Issue::HeadDown,
        Issue::HeadUp,
        Issue::HeadTiltLeft,
        Issue::HeadTiltRight,
        Issue::ShouldersUnlevel,
        Issue::ShouldersDepthMisaligned,
        Issue::BodyLeanLeft,
        Issue::BodyLeanRight,
    ];

    /// Whether this state counts against the user in coaching accounting.
    pub fn is_bad(self) -> bool {
        !matches!(self, Issue::Good | Issue::NoPerson)
    }

    /// Whether this issue is about viewing distance rather than pose.
    pub fn is_distance(self) -> bool {
        matches!(self, Issue::TooClose | Issue::TooFar)
    }

    /// Arena slot of a bad issue (its position in [`Issue::PRIORITY`]).
    ///
    /// `None` for `Good`/`NoPerson`, which carry no debounce state.
    pub fn slot(self) -> Option<usize> {
        match self {
            Issue::TooClose => Some(0),
            Issue::TooFar => Some(1),
            Issue::HeadDown => Some(2),
            Issue::HeadUp => Some(3),
            Issue::HeadTiltLeft => Some(4),
            Issue::HeadTiltRight => Some(5),
            Issue::ShouldersUnlevel => Some(6),
            Issue::ShouldersDepthMisaligned => Some(7),
            Issue::BodyLeanLeft => Some(8),
            Issue::BodyLeanRight => Some(9),
            Issue::Good | Issue::NoPerson => None,
        }
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Issue::TooClose => "too close",
            Issue::TooFar => "too far",
            Issue::HeadDown => "head down",
            Issue::HeadUp => "head up",
            Issue::HeadTiltLeft => "head tilted left",
            Issue::HeadTiltRight => "head tilted right",
            Issue::ShouldersUnlevel => "shoulders unlevel",
            Issue::ShouldersDepthMisaligned => "shoulders depth misaligned",
            Issue::BodyLeanLeft => "leaning left",
            Issue::BodyLeanRight => "leaning right",
            Issue::Good => "good",
            Issue::NoPerson => "no person",
        };
        write!(f, "{label}")
    }
}

// ============================================================================
// Issue Set
// ============================================================================

/// A compact set of bad issues (bitmask over the priority arena).
///
/// Iteration yields issues in priority order, which is what both the
/// stabilizer output ordering and primary selection rely on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueSet(u16);

impl IssueSet {
    pub const EMPTY: IssueSet = IssueSet(0);

    /// Insert a bad issue. `Good`/`NoPerson` are ignored — they are states,
    /// not set members.
    pub fn insert(&mut self, issue: Issue) {
        if let Some(slot) = issue.slot() {
            self.0 |= 1 << slot;
        }
    }

    pub fn contains(self, issue: Issue) -> bool {
        issue.slot().is_some_and(|slot| self.0 & (1 << slot) != 0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Issues in priority order.
    pub fn iter(self) -> impl Iterator<Item = Issue> {
        Issue::PRIORITY
            .into_iter()
            .filter(move |issue| self.contains(*issue))
    }

    /// Highest-priority member, if any.
    pub fn first(self) -> Option<Issue> {
        self.iter().next()
    }

    /// Materialize into a priority-ordered vector (for event payloads).
    pub fn to_vec(self) -> Vec<Issue> {
        self.iter().collect()
    }
}

impl FromIterator<Issue> for IssueSet {
    fn from_iter<T: IntoIterator<Item = Issue>>(iter: T) -> Self {
        let mut set = IssueSet::default();
        for issue in iter {
            set.insert(issue);
        }
        set
    }
}
