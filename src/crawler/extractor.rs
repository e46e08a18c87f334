//! Link extraction from rendered page content
//!
//! Rendered content is markdown-flavoured text that may still carry raw HTML.
//! Two kinds of links are pulled out of it:
//!
//! - **Navigation links**: markdown `[label](target)` links that pass the
//!   scope filter and are pages rather than downloadable files
//! - **Resource links**: markdown targets, `href="..."` and `src="..."` values
//!   whose extension maps to a file category, on any host
//!
//! Malformed content never fails extraction; unusable targets are skipped.

use crate::crawler::classifier::FileClassifier;
use crate::crawler::scope::ScopeFilter;
use crate::state::CrawlState;
use crate::url::resolve_link;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use url::Url;

static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]+)\)").expect("valid markdown link pattern"));

static HREF_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)href=["'](.*?)["']"#).expect("valid href pattern"));

static SRC_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)src=["'](.*?)["']"#).expect("valid src pattern"));

/// Extracts navigation and resource links from page content
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    scope: ScopeFilter,
    classifier: FileClassifier,
}

impl LinkExtractor {
    pub fn new(scope: ScopeFilter, classifier: FileClassifier) -> Self {
        Self { scope, classifier }
    }

    /// Returns the absolute page URLs linked from `content`
    ///
    /// Links to downloadable files are left to [`LinkExtractor::extract_resource_links`].
    pub fn extract_navigation_links(
        &self,
        content: &str,
        current_url: &str,
        state: &CrawlState,
    ) -> HashSet<String> {
        let Ok(base) = Url::parse(current_url) else {
            return HashSet::new();
        };

        markdown_targets(content)
            .filter_map(|target| resolve_link(target, &base))
            .filter(|url| self.classifier.classify(url).is_none())
            .filter(|url| self.scope.should_crawl(url, state))
            .collect()
    }

    /// Returns the absolute URLs of downloadable files referenced by `content`
    ///
    /// Off-site resources are kept: files are often served from another host.
    pub fn extract_resource_links(&self, content: &str, current_url: &str) -> HashSet<String> {
        let Ok(base) = Url::parse(current_url) else {
            return HashSet::new();
        };

        let attributes = [&*HREF_ATTR, &*SRC_ATTR]
            .into_iter()
            .flat_map(|pattern| pattern.captures_iter(content))
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()));

        markdown_targets(content)
            .chain(attributes)
            .filter_map(|target| resolve_link(target, &base))
            .filter(|url| self.classifier.classify(url).is_some())
            .collect()
    }
}

/// Yields the link targets of all markdown links in `content`
///
/// A target may carry a title (`[a](/x "About")`) or angle brackets
/// (`[a](</x>)`); only the bare URL is returned.
fn markdown_targets(content: &str) -> impl Iterator<Item = &str> {
    MARKDOWN_LINK
        .captures_iter(content)
        .filter_map(|caps| caps.get(2))
        .filter_map(|m| {
            let target = m.as_str().trim();
            if let Some(inner) = target.strip_prefix('<') {
                return inner.split('>').next();
            }
            target.split_whitespace().next()
        })
}
