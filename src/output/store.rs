//! Result store: the in-memory page record list and its report file
//!
//! Records are appended in completion order. Every persist serializes the full
//! current list and replaces the report file, so concurrent persists cannot
//! conflict: writers take turns and the last one wins.

use crate::output::report::{CrawlReport, PageRecord};
use crate::HarvestError;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Accumulates page records and writes the aggregate report
pub struct ResultStore {
    base_url: String,
    report_path: PathBuf,
    records: Mutex<Vec<PageRecord>>,
    write_lock: tokio::sync::Mutex<()>,
}

impl ResultStore {
    /// Creates an empty store that persists to `report_path`
    pub fn new(base_url: impl Into<String>, report_path: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into(),
            report_path: report_path.into(),
            records: Mutex::new(Vec::new()),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Path of the report file
    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// Appends a page record
    pub fn append(&self, record: PageRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    /// Number of records appended so far
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no record has been appended
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds a report from the records as they are right now
    pub fn snapshot(&self) -> CrawlReport {
        let records = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        CrawlReport::new(self.base_url.clone(), records)
    }

    /// Writes the current snapshot to the report file, replacing it
    ///
    /// The snapshot is taken after this writer's turn starts, so the file on
    /// disk always reflects the newest state any writer saw. The body goes to a
    /// sibling temporary file first and is renamed over the report.
    pub async fn persist(&self) -> Result<(), HarvestError> {
        let _turn = self.write_lock.lock().await;

        let report = self.snapshot();
        let body = serde_json::to_vec_pretty(&report)?;

        let tmp_path = self.report_path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &body).await?;
        tokio::fs::rename(&tmp_path, &self.report_path).await?;

        tracing::debug!(
            "Saved report with {} pages to {}",
            report.total_pages_crawled,
            self.report_path.display()
        );
        Ok(())
    }
}

/// Reads a report file written by [`ResultStore::persist`]
pub fn load_report(path: &Path) -> Result<CrawlReport, HarvestError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
