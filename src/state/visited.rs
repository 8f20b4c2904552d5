use crate::state::VisitState;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

/// Concurrency-safe claim store for one crawl run
///
/// The set is the single synchronization point preventing duplicate work:
/// `try_claim` performs an insert-if-absent under the lock, so exactly one
/// caller ever sees `true` for a given URL.
#[derive(Debug, Default)]
pub struct VisitedSet {
    entries: Mutex<HashMap<Url, VisitState>>,
}

impl VisitedSet {
    /// Creates an empty visited set
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Url, VisitState>> {
        // Critical sections are single map operations; a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims a URL for fetching
    ///
    /// Returns true exactly the first time it is called for a URL in this
    /// run, moving it from `Unvisited` to `InFlight`.
    pub fn try_claim(&self, url: &Url) -> bool {
        let mut entries = self.lock();
        if entries.contains_key(url) {
            return false;
        }
        entries.insert(url.clone(), VisitState::InFlight);
        true
    }

    /// Moves a claimed URL to a terminal state
    ///
    /// Returns false (and leaves the entry untouched) if the transition is
    /// not valid from the current state.
    pub fn finish(&self, url: &Url, target: VisitState) -> bool {
        let mut entries = self.lock();
        match entries.get_mut(url) {
            Some(state) if state.can_transition_to(target) => {
                *state = target;
                true
            }
            Some(state) => {
                tracing::warn!(
                    "Invalid state transition for {}: {} -> {}",
                    url,
                    state,
                    target
                );
                false
            }
            None => false,
        }
    }

    /// Marks a claimed URL as checked
    pub fn mark_checked(&self, url: &Url) -> bool {
        self.finish(url, VisitState::Checked)
    }

    /// Marks a claimed URL as discarded by the check cap
    pub fn mark_skipped(&self, url: &Url) -> bool {
        self.finish(url, VisitState::Skipped)
    }

    /// Returns the current state of a URL
    pub fn state_of(&self, url: &Url) -> VisitState {
        self.lock()
            .get(url)
            .copied()
            .unwrap_or(VisitState::Unvisited)
    }

    /// Returns the number of claimed URLs
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether nothing has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns every claimed URL, sorted
    pub fn claimed(&self) -> Vec<Url> {
        let mut urls: Vec<Url> = self.lock().keys().cloned().collect();
        urls.sort();
        urls
    }

    /// Counts the URLs currently in the given state
    pub fn count_in_state(&self, state: VisitState) -> usize {
        self.lock().values().filter(|s| **s == state).count()
    }
}
