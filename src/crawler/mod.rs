//! Crawler module for page fetching, file downloading and crawl coordination
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and page rendering
//! - Link extraction, scope filtering and file classification
//! - File downloads into the run directory
//! - Batch scheduling and overall crawl coordination

mod classifier;
mod coordinator;
mod downloader;
mod extractor;
mod fetcher;
mod page;
mod renderer;
mod scheduler;
mod scope;

pub use classifier::{path_extension, FileCategory, FileClassifier};
pub use coordinator::{run_crawl, run_dir_for, Coordinator};
pub use downloader::{file_name_from_url, Downloader};
pub use extractor::LinkExtractor;
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use page::{PageFetcher, PageOutcome, DEFAULT_TITLE};
pub use renderer::{render_html, HttpRenderer, PageRenderer, RenderedPage};
pub use scheduler::Scheduler;
pub use scope::ScopeFilter;

use crate::config::Config;
use crate::output::CrawlStatistics;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration and base URL
/// 2. Create the run directory and its category subdirectories
/// 3. Crawl in batches until the frontier is empty or the page ceiling is hit
/// 4. Write the final report
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `base_url` - The starting page
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Crawl ran to completion
/// * `Err(HarvestError)` - The crawl could not be set up
pub async fn crawl(config: Config, base_url: &str) -> crate::Result<CrawlStatistics> {
    run_crawl(config, base_url).await
}
