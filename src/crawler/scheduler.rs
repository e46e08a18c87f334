//! Frontier scheduler
//!
//! This module handles:
//! - Selecting the next batch from the pending set
//! - Folding finished batches back into the frontier
//! - The page ceiling check
//! - The fixed delay between batches

use crate::config::CrawlerConfig;
use crate::state::CrawlState;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Scheduler drives the batch loop over a shared crawl state
///
/// The state lock is only taken for short synchronous sections and is never
/// held across an await.
pub struct Scheduler {
    state: Arc<Mutex<CrawlState>>,
    batch_width: usize,
    batch_delay: Duration,
}

impl Scheduler {
    /// Creates a scheduler over `state` using the configured batch settings
    pub fn new(state: Arc<Mutex<CrawlState>>, config: &CrawlerConfig) -> Self {
        Self {
            state,
            batch_width: config.batch_width.max(1),
            batch_delay: Duration::from_millis(config.batch_delay_ms),
        }
    }

    fn state(&self) -> MutexGuard<'_, CrawlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns true while there is pending work and the ceiling is not reached
    ///
    /// The ceiling is checked between batches only, so a run may visit up to
    /// `batch_width - 1` pages past it.
    pub fn should_continue(&self, max_pages: Option<usize>) -> bool {
        let state = self.state();
        if state.is_exhausted() {
            return false;
        }
        match max_pages {
            Some(max) => state.visited_count() < max,
            None => true,
        }
    }

    /// Selects the next batch without removing it from the pending set
    pub fn next_batch(&self) -> Vec<String> {
        self.state().select_batch(self.batch_width)
    }

    /// Merges a finished batch and the links it discovered into the frontier
    pub fn complete_batch<I>(&self, batch: &[String], discovered: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.state().merge_batch(batch, discovered);
    }

    /// Waits the fixed delay between two batches
    pub async fn throttle(&self) {
        if !self.batch_delay.is_zero() {
            tokio::time::sleep(self.batch_delay).await;
        }
    }

    pub fn visited_count(&self) -> usize {
        self.state().visited_count()
    }

    pub fn pending_count(&self) -> usize {
        self.state().pending_count()
    }

    /// Snapshot of the pending URLs
    pub fn pending_urls(&self) -> Vec<String> {
        self.state().pending_urls()
    }
}
