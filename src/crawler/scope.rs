//! Scope filter: which URLs may ever be crawled as pages

use crate::config::ScopeConfig;
use crate::state::CrawlState;
use crate::url::{extract_authority, normalize_url};
use crate::UrlError;
use url::Url;

/// Decides whether a candidate URL belongs in the frontier
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    base_authority: String,
    excluded_extensions: Vec<String>,
}

impl ScopeFilter {
    /// Creates a filter bound to the base URL's host (and explicit port)
    pub fn new(base_url: &Url, config: &ScopeConfig) -> Result<Self, UrlError> {
        let base_authority = extract_authority(base_url).ok_or(UrlError::MissingDomain)?;

        Ok(Self {
            base_authority,
            excluded_extensions: config
                .excluded_extensions
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
        })
    }

    /// The authority every crawled URL must share
    pub fn base_authority(&self) -> &str {
        &self.base_authority
    }

    /// Returns true if `url` should be crawled given the current state
    ///
    /// Rejects, in order:
    /// 1. URLs that are not HTTP(S) or cannot be parsed
    /// 2. URLs already visited (compared after normalization)
    /// 3. URLs on another host or port than the base URL
    /// 4. URLs whose path ends with an excluded extension
    ///
    /// This is a pure check; it never modifies `state`.
    pub fn should_crawl(&self, url: &str, state: &CrawlState) -> bool {
        let normalized = match normalize_url(url) {
            Ok(n) => n,
            Err(_) => return false,
        };

        if state.is_visited(normalized.as_str()) {
            return false;
        }

        if extract_authority(&normalized).as_deref() != Some(self.base_authority.as_str()) {
            return false;
        }

        let path = normalized.path().to_lowercase();
        !self
            .excluded_extensions
            .iter()
            .any(|ext| path.ends_with(ext.as_str()))
    }
}
