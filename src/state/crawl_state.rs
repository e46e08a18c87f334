//! Visited and pending URL sets of one crawl run
//!
//! A URL is in at most one of the two sets once a batch has been merged, and it
//! moves from unvisited to visited exactly once. Pending URLs are kept ordered
//! so batch selection is deterministic.

use std::collections::{BTreeSet, HashSet};

/// Frontier and visitation state owned by a single coordinator
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    visited: HashSet<String>,
    pending: BTreeSet<String>,
}

impl CrawlState {
    /// Creates the initial state: nothing visited, the seed pending
    pub fn new(seed: impl Into<String>) -> Self {
        let mut pending = BTreeSet::new();
        pending.insert(seed.into());

        Self {
            visited: HashSet::new(),
            pending,
        }
    }

    /// Marks a URL as visited
    ///
    /// Returns `false` when the URL was already visited, in which case the
    /// caller must not fetch it.
    pub fn claim(&mut self, url: &str) -> bool {
        if self.visited.contains(url) {
            return false;
        }
        self.visited.insert(url.to_string())
    }

    /// Returns true if the URL has been claimed
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Number of claimed URLs
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Number of URLs waiting for a future batch
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty()
    }

    /// Snapshot of the pending URLs in batch-selection order
    pub fn pending_urls(&self) -> Vec<String> {
        self.pending.iter().cloned().collect()
    }

    /// Selects up to `width` pending URLs for the next batch
    ///
    /// The selected URLs stay in the pending set until [`CrawlState::merge_batch`]
    /// removes them.
    pub fn select_batch(&self, width: usize) -> Vec<String> {
        self.pending.iter().take(width).cloned().collect()
    }

    /// Folds the outcome of a finished batch into the frontier
    ///
    /// pending := (pending ∪ discovered) − visited − batch
    pub fn merge_batch<I>(&mut self, batch: &[String], discovered: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.pending.extend(discovered);

        for url in batch {
            self.pending.remove(url);
        }

        let visited = &self.visited;
        self.pending.retain(|url| !visited.contains(url));
    }
}
