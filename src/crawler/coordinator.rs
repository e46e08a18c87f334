//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the batch loop that coordinates all aspects of a
//! crawl run, including:
//! - Validating the configuration and preparing the run directory
//! - Owning the crawl state, the result store and the HTTP client
//! - Dispatching batches of page fetches and merging their results
//! - Writing the final report and statistics

use crate::config::{validate, Config};
use crate::crawler::classifier::{FileCategory, FileClassifier};
use crate::crawler::downloader::Downloader;
use crate::crawler::extractor::LinkExtractor;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::page::PageFetcher;
use crate::crawler::renderer::{HttpRenderer, PageRenderer};
use crate::crawler::scheduler::Scheduler;
use crate::crawler::scope::ScopeFilter;
use crate::output::{CrawlStatistics, ResultStore};
use crate::state::CrawlState;
use crate::url::{extract_authority, normalize_url};
use crate::{HarvestError, UrlError};
use futures::future::join_all;
use reqwest::Client;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use url::Url;

/// Main crawler coordinator structure
///
/// Each coordinator owns the complete state of one crawl, so several crawls
/// can run side by side in one process.
pub struct Coordinator {
    config: Arc<Config>,
    base_url: Url,
    run_dir: PathBuf,
    store: Arc<ResultStore>,
    scheduler: Scheduler,
    pages: PageFetcher,
}

impl Coordinator {
    /// Creates a coordinator that renders pages over HTTP
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `base_url` - The page the crawl starts from; its host bounds the crawl
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Run directory created, ready to crawl
    /// * `Err(HarvestError)` - Invalid configuration or base URL, or the run
    ///   directory or HTTP client could not be created
    pub fn new(config: Config, base_url: &str) -> Result<Self, HarvestError> {
        let client = build_http_client(&config)?;
        let renderer = Arc::new(HttpRenderer::new(client.clone()));
        Self::build(config, base_url, client, renderer)
    }

    /// Creates a coordinator that renders pages with `renderer`
    ///
    /// Downloads still go over HTTP.
    pub fn with_renderer(
        config: Config,
        base_url: &str,
        renderer: Arc<dyn PageRenderer>,
    ) -> Result<Self, HarvestError> {
        let client = build_http_client(&config)?;
        Self::build(config, base_url, client, renderer)
    }

    fn build(
        config: Config,
        base_url: &str,
        client: Client,
        renderer: Arc<dyn PageRenderer>,
    ) -> Result<Self, HarvestError> {
        validate(&config)?;

        let base_url = normalize_url(base_url)?;
        let run_dir = run_dir_for(&config, &base_url)?;

        std::fs::create_dir_all(&run_dir)?;
        for category in FileCategory::ALL {
            std::fs::create_dir_all(run_dir.join(category.dir_name()))?;
        }
        tracing::debug!("Run directory: {}", run_dir.display());

        let state = Arc::new(Mutex::new(CrawlState::new(base_url.as_str())));
        let store = Arc::new(ResultStore::new(
            base_url.as_str(),
            run_dir.join(&config.output.report_file_name),
        ));

        let classifier = FileClassifier::new(&config.file_types);
        let scope = ScopeFilter::new(&base_url, &config.scope)?;
        let downloader = Downloader::new(
            client,
            classifier.clone(),
            run_dir.clone(),
            Arc::clone(&store),
        );
        let pages = PageFetcher::new(
            renderer,
            downloader,
            LinkExtractor::new(scope, classifier),
            Arc::clone(&store),
            Arc::clone(&state),
        );
        let scheduler = Scheduler::new(state, &config.crawler);

        Ok(Self {
            config: Arc::new(config),
            base_url,
            run_dir,
            store,
            scheduler,
            pages,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Directory holding the report and the category subdirectories
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn report_path(&self) -> &Path {
        self.store.report_path()
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// URLs left in the frontier
    pub fn pending_urls(&self) -> Vec<String> {
        self.scheduler.pending_urls()
    }

    pub fn visited_count(&self) -> usize {
        self.scheduler.visited_count()
    }

    /// Runs the crawl with the configured page ceiling
    pub async fn run(&self) -> CrawlStatistics {
        self.crawl(self.config.crawler.max_pages).await
    }

    /// Runs the batch loop until the frontier is empty or `max_pages` pages
    /// have been visited
    ///
    /// Nothing that happens after the crawl starts makes it fail: page and
    /// download errors are logged and skipped.
    pub async fn crawl(&self, max_pages: Option<usize>) -> CrawlStatistics {
        tracing::info!("Starting crawl of {}", self.base_url);

        let start_time = Instant::now();
        let mut stats = CrawlStatistics::default();

        while self.scheduler.should_continue(max_pages) {
            let batch = self.scheduler.next_batch();
            tracing::debug!("Dispatching batch of {} pages", batch.len());

            let outcomes = join_all(batch.iter().map(|url| self.pages.fetch_page(url))).await;
            stats.batches += 1;

            let mut discovered = HashSet::new();
            for outcome in outcomes {
                discovered.extend(outcome.links);
                for download in outcome.downloads {
                    stats.files_downloaded += 1;
                    stats.bytes_downloaded += download.size;
                    *stats.files_by_category.entry(download.file_type).or_insert(0) += 1;
                }
            }
            self.scheduler.complete_batch(&batch, discovered);

            tracing::info!(
                "Crawled: {} pages, Downloaded: {} files, Remaining: {}",
                self.scheduler.visited_count(),
                stats.files_downloaded,
                self.scheduler.pending_count()
            );

            if self.scheduler.should_continue(max_pages) {
                self.scheduler.throttle().await;
            }
        }

        if let Err(e) = self.store.persist().await {
            tracing::error!(
                "Failed to save report to {}: {}",
                self.store.report_path().display(),
                e
            );
        }

        stats.pages_visited = self.scheduler.visited_count();
        stats.pages_recorded = self.store.len();
        stats.pending_remaining = self.scheduler.pending_count();
        stats.elapsed = Some(start_time.elapsed());

        tracing::info!(
            "Crawl completed: {} pages recorded, {} files downloaded in {:?}",
            stats.pages_recorded,
            stats.files_downloaded,
            start_time.elapsed()
        );

        stats
    }
}

/// `<output_root>/<authority>_<suffix>`, with `:` in the authority replaced
pub fn run_dir_for(config: &Config, base_url: &Url) -> Result<PathBuf, HarvestError> {
    let authority = extract_authority(base_url).ok_or(UrlError::MissingDomain)?;
    let dir_name = format!(
        "{}_{}",
        authority.replace(':', "_"),
        config.output.download_dir_suffix
    );
    Ok(Path::new(&config.output.output_root).join(dir_name))
}

/// Creates a coordinator for `base_url` and runs it to completion
pub async fn run_crawl(config: Config, base_url: &str) -> Result<CrawlStatistics, HarvestError> {
    let coordinator = Coordinator::new(config, base_url)?;
    Ok(coordinator.run().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlerConfig;
    use crate::crawler::renderer::RenderedPage;
    use crate::output::load_report;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tempfile::TempDir;

    const BASE: &str = "https://example.com/";

    /// Serves fixed content per URL and counts render calls
    #[derive(Default)]
    struct MemoryRenderer {
        pages: HashMap<String, String>,
        calls: Mutex<HashMap<String, usize>>,
    }

    impl MemoryRenderer {
        fn with_pages(pages: &[(&str, String)]) -> Arc<Self> {
            Arc::new(Self {
                pages: pages
                    .iter()
                    .map(|(url, content)| (url.to_string(), content.clone()))
                    .collect(),
                ..Self::default()
            })
        }

        fn calls(&self, url: &str) -> usize {
            self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl PageRenderer for MemoryRenderer {
        async fn render(&self, url: &str) -> Result<RenderedPage, HarvestError> {
            *self.calls.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;
            match self.pages.get(url) {
                Some(content) => Ok(RenderedPage {
                    content: content.clone(),
                    title: Some(url.to_string()),
                    final_url: None,
                }),
                None => Err(HarvestError::Render {
                    url: url.to_string(),
                    message: "unreachable".to_string(),
                }),
            }
        }
    }

    fn test_config(dir: &TempDir, batch_width: usize) -> Config {
        let mut config = Config::default();
        config.crawler = CrawlerConfig {
            batch_width,
            batch_delay_ms: 0,
            ..CrawlerConfig::default()
        };
        config.output.output_root = dir.path().to_string_lossy().into_owned();
        config
    }

    fn links(paths: &[&str]) -> String {
        paths
            .iter()
            .map(|p| format!("[{}](/{})", p, p))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_new_creates_run_dir() {
        let dir = TempDir::new().unwrap();
        let coordinator =
            Coordinator::with_renderer(test_config(&dir, 5), BASE, MemoryRenderer::with_pages(&[]))
                .unwrap();

        assert_eq!(
            coordinator.run_dir(),
            dir.path().join("example.com_downloads")
        );
        for category in FileCategory::ALL {
            assert!(coordinator.run_dir().join(category.dir_name()).is_dir());
        }
        assert_eq!(coordinator.pending_urls(), vec![BASE.to_string()]);
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let dir = TempDir::new().unwrap();
        let result = Coordinator::with_renderer(
            test_config(&dir, 5),
            "ftp://example.com/",
            MemoryRenderer::with_pages(&[]),
        );
        assert!(matches!(result, Err(HarvestError::UrlError(_))));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let result = Coordinator::with_renderer(
            test_config(&dir, 0),
            BASE,
            MemoryRenderer::with_pages(&[]),
        );
        assert!(matches!(result, Err(HarvestError::Config(_))));
    }

    #[test]
    fn test_run_dir_with_port() {
        let config = Config::default();
        let base = Url::parse("http://127.0.0.1:8080/").unwrap();
        assert_eq!(
            run_dir_for(&config, &base).unwrap(),
            Path::new("./sample_result").join("127.0.0.1_8080_downloads")
        );
    }

    #[tokio::test]
    async fn test_max_pages_one() {
        let dir = TempDir::new().unwrap();
        let paths: Vec<String> = (0..10).map(|i| format!("page{}", i)).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let renderer = MemoryRenderer::with_pages(&[(BASE, links(&refs))]);

        let coordinator =
            Coordinator::with_renderer(test_config(&dir, 5), BASE, renderer).unwrap();
        let stats = coordinator.crawl(Some(1)).await;

        assert_eq!(coordinator.visited_count(), 1);
        assert_eq!(coordinator.pending_urls().len(), 10);
        assert_eq!(stats.pages_recorded, 1);
        assert_eq!(stats.batches, 1);

        let report = load_report(coordinator.report_path()).unwrap();
        assert_eq!(report.total_pages_crawled, 1);
        assert_eq!(report.results.len(), 1);
    }

    #[tokio::test]
    async fn test_overshoot_bounded_by_batch_width() {
        let dir = TempDir::new().unwrap();
        let paths: Vec<String> = (0..10).map(|i| format!("p{}", i)).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let mut pages = vec![(BASE, links(&refs))];
        let urls: Vec<String> = paths
            .iter()
            .map(|p| format!("https://example.com/{}", p))
            .collect();
        for url in &urls {
            pages.push((url.as_str(), String::new()));
        }
        let renderer = MemoryRenderer::with_pages(&pages);

        let coordinator =
            Coordinator::with_renderer(test_config(&dir, 5), BASE, renderer).unwrap();
        coordinator.crawl(Some(2)).await;

        let visited = coordinator.visited_count();
        assert!(visited >= 2);
        assert!(visited <= 2 + 5 - 1);
    }

    #[tokio::test]
    async fn test_each_page_rendered_once() {
        let dir = TempDir::new().unwrap();
        let renderer = MemoryRenderer::with_pages(&[
            (BASE, links(&["a", "b"])),
            ("https://example.com/a", links(&["", "b"])),
            ("https://example.com/b", links(&["a", "c"])),
            ("https://example.com/c", links(&["a", "b", ""])),
        ]);

        let coordinator =
            Coordinator::with_renderer(test_config(&dir, 2), BASE, renderer.clone()).unwrap();
        let stats = coordinator.crawl(None).await;

        assert_eq!(stats.pages_visited, 4);
        assert_eq!(stats.pages_recorded, 4);
        assert_eq!(stats.pending_remaining, 0);
        for url in [
            BASE,
            "https://example.com/a",
            "https://example.com/b",
            "https://example.com/c",
        ] {
            assert_eq!(renderer.calls(url), 1, "{}", url);
        }
    }

    #[tokio::test]
    async fn test_unreachable_base_writes_empty_report() {
        let dir = TempDir::new().unwrap();
        let coordinator =
            Coordinator::with_renderer(test_config(&dir, 5), BASE, MemoryRenderer::with_pages(&[]))
                .unwrap();

        let stats = coordinator.crawl(None).await;

        assert_eq!(stats.pages_visited, 1);
        assert_eq!(stats.pages_recorded, 0);
        assert!(coordinator.pending_urls().is_empty());

        let report = load_report(coordinator.report_path()).unwrap();
        assert_eq!(report.base_url, BASE);
        assert_eq!(report.total_pages_crawled, 0);
        assert!(report.results.is_empty());
    }

    #[tokio::test]
    async fn test_failed_sibling_does_not_stop_batch() {
        let dir = TempDir::new().unwrap();
        let renderer = MemoryRenderer::with_pages(&[
            (BASE, links(&["ok", "broken"])),
            ("https://example.com/ok", "fine".to_string()),
        ]);

        let coordinator =
            Coordinator::with_renderer(test_config(&dir, 5), BASE, renderer).unwrap();
        let stats = coordinator.crawl(None).await;

        assert_eq!(stats.pages_visited, 3);
        assert_eq!(stats.pages_recorded, 2);

        let report = load_report(coordinator.report_path()).unwrap();
        let recorded: HashSet<&str> = report.results.iter().map(|r| r.url.as_str()).collect();
        assert!(recorded.contains("https://example.com/ok"));
        assert!(!recorded.contains("https://example.com/broken"));
    }
}
