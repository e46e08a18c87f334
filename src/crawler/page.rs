//! Page fetch task: one page through render, download, record and extract

use crate::crawler::downloader::Downloader;
use crate::crawler::extractor::LinkExtractor;
use crate::crawler::renderer::{PageRenderer, RenderedPage};
use crate::output::{DownloadRecord, PageRecord, ResultStore};
use crate::state::CrawlState;
use crate::HarvestError;
use chrono::Utc;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Title recorded for pages the renderer found no title for
pub const DEFAULT_TITLE: &str = "No Title";

/// What a page fetch hands back to the scheduler
#[derive(Debug, Clone, Default)]
pub struct PageOutcome {
    /// In-scope page URLs found on the page
    pub links: HashSet<String>,

    /// Files downloaded from the page
    pub downloads: Vec<DownloadRecord>,
}

/// Runs page fetches for one crawl
pub struct PageFetcher {
    renderer: Arc<dyn PageRenderer>,
    downloader: Downloader,
    extractor: LinkExtractor,
    store: Arc<ResultStore>,
    state: Arc<Mutex<CrawlState>>,
}

impl PageFetcher {
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        downloader: Downloader,
        extractor: LinkExtractor,
        store: Arc<ResultStore>,
        state: Arc<Mutex<CrawlState>>,
    ) -> Self {
        Self {
            renderer,
            downloader,
            extractor,
            store,
            state,
        }
    }

    /// Fetches one page
    ///
    /// The URL is marked visited before any I/O and stays visited whatever
    /// happens next. A URL that was already visited yields an empty outcome
    /// without a fetch. Render failures are logged and also yield an empty
    /// outcome.
    pub async fn fetch_page(&self, url: &str) -> PageOutcome {
        let claimed = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .claim(url);
        if !claimed {
            tracing::debug!("Skipping already visited {}", url);
            return PageOutcome::default();
        }

        tracing::info!("Crawling: {}", url);

        match self.process(url).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Error crawling {}: {}", url, e);
                PageOutcome::default()
            }
        }
    }

    async fn process(&self, url: &str) -> Result<PageOutcome, HarvestError> {
        let RenderedPage {
            content,
            title,
            final_url,
        } = self.renderer.render(url).await?;
        let crawled_at = Utc::now();

        // Relative links resolve against where the page was actually served
        let base = final_url.as_deref().unwrap_or(url);

        let mut resources: Vec<String> = self
            .extractor
            .extract_resource_links(&content, base)
            .into_iter()
            .collect();
        resources.sort();

        let downloads: Vec<DownloadRecord> =
            join_all(resources.iter().map(|resource| self.downloader.download(resource)))
                .await
                .into_iter()
                .flatten()
                .collect();

        let links = {
            let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            self.extractor
                .extract_navigation_links(&content, base, &state)
        };

        self.store.append(PageRecord {
            url: url.to_string(),
            content,
            title: title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            crawled_at,
            downloaded_files: downloads.clone(),
        });
        if let Err(e) = self.store.persist().await {
            tracing::warn!("Failed to save report after crawling {}: {}", url, e);
        }

        Ok(PageOutcome { links, downloads })
    }
}
