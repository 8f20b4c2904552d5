use crate::crawler::BrokenReason;
use crate::output::BrokenLink;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use url::Url;

/// Thread-safe, insert-only collection of broken URLs
///
/// Each URL is fetched at most once per run, so in practice every URL is
/// recorded once; a second record for the same URL keeps the first reason.
#[derive(Debug, Default)]
pub struct BrokenLinks {
    entries: Mutex<BTreeMap<Url, BrokenReason>>,
}

impl BrokenLinks {
    /// Creates an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a broken URL
    ///
    /// Returns false if the URL was already recorded.
    pub fn record(&self, url: Url, reason: BrokenReason) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&url) {
            return false;
        }
        entries.insert(url, reason);
        true
    }

    /// Returns the number of broken URLs recorded so far
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a sorted copy of everything recorded so far
    pub fn snapshot(&self) -> Vec<BrokenLink> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(url, reason)| BrokenLink {
                url: url.to_string(),
                reason: reason.clone(),
            })
            .collect()
    }
}
