/// Visit state definitions for tracking crawl progress
///
/// This module defines all possible states a URL can be in during one crawl run.
use std::fmt;

/// Represents the current state of a URL in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitState {
    /// URL has not been claimed by any worker
    Unvisited,

    /// URL has been claimed and is queued or being fetched
    InFlight,

    /// The fetcher returned an outcome for this URL
    Checked,

    /// URL was claimed but discarded because the check cap was reached or the run stopped
    Skipped,
}

impl VisitState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Checked | Self::Skipped)
    }

    /// Checks if a transition from this state to another state is valid
    ///
    /// # Valid Transitions
    ///
    /// - Unvisited → InFlight
    /// - InFlight → Checked
    /// - InFlight → Skipped
    pub fn can_transition_to(&self, target: VisitState) -> bool {
        matches!(
            (self, target),
            (Self::Unvisited, Self::InFlight)
                | (Self::InFlight, Self::Checked)
                | (Self::InFlight, Self::Skipped)
        )
    }
}

impl fmt::Display for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unvisited => "unvisited",
            Self::InFlight => "in_flight",
            Self::Checked => "checked",
            Self::Skipped => "skipped",
        };
        write!(f, "{}", name)
    }
}
