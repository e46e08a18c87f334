//! Crawl statistics
//!
//! Statistics are built either at the end of a run by the coordinator, or from
//! an existing report file for `--stats`.

use crate::crawler::FileCategory;
use crate::output::report::CrawlReport;
use crate::output::store::load_report;
use crate::HarvestError;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    /// Number of URLs claimed by page fetches (successful or not)
    pub pages_visited: usize,

    /// Number of pages with a record in the report
    pub pages_recorded: usize,

    /// URLs still in the frontier when the crawl stopped
    pub pending_remaining: usize,

    /// Number of files downloaded
    pub files_downloaded: usize,

    /// Total bytes written to disk
    pub bytes_downloaded: u64,

    /// Download count per category
    pub files_by_category: BTreeMap<FileCategory, usize>,

    /// Number of batches dispatched
    pub batches: usize,

    /// Wall-clock time of the crawl loop
    pub elapsed: Option<Duration>,
}

impl CrawlStatistics {
    /// Computes page and download statistics from a report
    ///
    /// Fields the report does not carry (`pending_remaining`, `batches`,
    /// `elapsed`) are left at their defaults, and `pages_visited` falls back
    /// to the recorded page count.
    pub fn from_report(report: &CrawlReport) -> Self {
        let mut stats = Self {
            pages_visited: report.results.len(),
            pages_recorded: report.results.len(),
            ..Self::default()
        };

        for download in report.downloads() {
            stats.files_downloaded += 1;
            stats.bytes_downloaded += download.size;
            *stats.files_by_category.entry(download.file_type).or_insert(0) += 1;
        }

        stats
    }
}

/// Loads statistics from a report file
pub fn load_statistics(path: &Path) -> Result<CrawlStatistics, HarvestError> {
    let report = load_report(path)?;
    Ok(CrawlStatistics::from_report(&report))
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages visited: {}", stats.pages_visited);
    println!("  Pages recorded: {}", stats.pages_recorded);
    println!("  Remaining in frontier: {}", stats.pending_remaining);
    if stats.batches > 0 {
        println!("  Batches: {}", stats.batches);
    }
    if let Some(elapsed) = stats.elapsed {
        println!("  Elapsed: {:.1}s", elapsed.as_secs_f64());
    }
    println!();

    println!("Downloads:");
    println!(
        "  Files: {} ({} bytes)",
        stats.files_downloaded, stats.bytes_downloaded
    );
    for (category, count) in &stats.files_by_category {
        println!("  {}: {}", category, count);
    }
    println!();

    let success_rate = if stats.pages_visited > 0 {
        (stats.pages_recorded as f64 / stats.pages_visited as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} pages recorded)",
        success_rate, stats.pages_recorded, stats.pages_visited
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::report::{DownloadRecord, PageRecord};
    use chrono::Utc;

    fn download(url: &str, file_type: FileCategory, size: u64) -> DownloadRecord {
        DownloadRecord {
            url: url.to_string(),
            local_path: format!("out/{}", url),
            file_type,
            size,
        }
    }

    #[test]
    fn test_statistics_from_report() {
        let report = CrawlReport::new(
            "https://example.com/",
            vec![
                PageRecord {
                    url: "https://example.com/".to_string(),
                    content: String::new(),
                    title: "Home".to_string(),
                    crawled_at: Utc::now(),
                    downloaded_files: vec![
                        download("a.pdf", FileCategory::Documents, 100),
                        download("b.png", FileCategory::Images, 20),
                    ],
                },
                PageRecord {
                    url: "https://example.com/about".to_string(),
                    content: String::new(),
                    title: "About".to_string(),
                    crawled_at: Utc::now(),
                    downloaded_files: vec![download("c.png", FileCategory::Images, 5)],
                },
            ],
        );

        let stats = CrawlStatistics::from_report(&report);

        assert_eq!(stats.pages_recorded, 2);
        assert_eq!(stats.files_downloaded, 3);
        assert_eq!(stats.bytes_downloaded, 125);
        assert_eq!(stats.files_by_category.get(&FileCategory::Images), Some(&2));
        assert_eq!(stats.files_by_category.get(&FileCategory::Documents), Some(&1));
        assert_eq!(stats.files_by_category.get(&FileCategory::Videos), None);
    }

    #[test]
    fn test_load_statistics_missing_file() {
        let result = load_statistics(Path::new("/nonexistent/crawler_results.json"));
        assert!(matches!(result, Err(HarvestError::Io(_))));
    }
}
