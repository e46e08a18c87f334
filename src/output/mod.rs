//! Output module for crawl results
//!
//! This module handles:
//! - The page and download records that make up the crawl report
//! - The result store that keeps the JSON report file current during a crawl
//! - Crawl statistics

mod report;
mod store;
pub mod stats;

pub use report::{CrawlReport, DownloadRecord, PageRecord};
pub use stats::{load_statistics, print_statistics, CrawlStatistics};
pub use store::{load_report, ResultStore};
