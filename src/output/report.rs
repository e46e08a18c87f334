//! Crawl report records
//!
//! These types are the JSON shape of the report file:
//!
//! ```json
//! {
//!   "base_url": "...",
//!   "total_pages_crawled": 1,
//!   "crawl_date": "...",
//!   "results": [
//!     {
//!       "url": "...", "content": "...", "title": "...", "crawled_at": "...",
//!       "downloaded_files": [
//!         { "url": "...", "local_path": "...", "file_type": "documents", "size": 123 }
//!       ]
//!     }
//!   ]
//! }
//! ```

use crate::crawler::FileCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file fetched and written to disk during the crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    /// Source URL of the file
    pub url: String,

    /// Where the body was written
    pub local_path: String,

    /// Category the file was stored under
    pub file_type: FileCategory,

    /// Number of bytes written
    pub size: u64,
}

/// One successfully fetched page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// The page URL
    pub url: String,

    /// Rendered text content
    pub content: String,

    /// Page title, or the placeholder when the renderer found none
    pub title: String,

    /// When the page was rendered
    pub crawled_at: DateTime<Utc>,

    /// Files downloaded from links on this page
    pub downloaded_files: Vec<DownloadRecord>,
}

/// The full report as written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlReport {
    pub base_url: String,

    /// Equal to `results.len()` at the time the report was written
    pub total_pages_crawled: usize,

    /// When the report was written
    pub crawl_date: DateTime<Utc>,

    pub results: Vec<PageRecord>,
}

impl CrawlReport {
    /// Builds a report from the current record list
    pub fn new(base_url: impl Into<String>, results: Vec<PageRecord>) -> Self {
        Self {
            base_url: base_url.into(),
            total_pages_crawled: results.len(),
            crawl_date: Utc::now(),
            results,
        }
    }

    /// Iterates over every download of every page
    pub fn downloads(&self) -> impl Iterator<Item = &DownloadRecord> {
        self.results.iter().flat_map(|page| page.downloaded_files.iter())
    }
}
