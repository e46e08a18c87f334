//! URL handling module for Site-Harvester
//!
//! This module provides the normalization that defines URL identity inside a
//! crawl, authority extraction for same-site checks, and resolution of link
//! targets found in page content.

mod domain;
mod normalize;

use ::url::Url;

// Re-export main functions
pub use domain::{extract_authority, extract_domain};
pub use normalize::normalize_url;

/// Resolves a link target against the page it was found on
///
/// Returns the normalized absolute URL, or `None` when the target should be
/// ignored:
/// - empty targets and fragment-only anchors
/// - `javascript:`, `mailto:`, `tel:` and `data:` targets
/// - anything that does not resolve to an HTTP(S) URL with a host
///
/// # Examples
///
/// ```
/// use site_harvester::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/").unwrap();
/// assert_eq!(
///     resolve_link("guide.pdf", &base).as_deref(),
///     Some("https://example.com/docs/guide.pdf")
/// );
/// assert_eq!(resolve_link("mailto:someone@example.com", &base), None);
/// ```
pub fn resolve_link(target: &str, base_url: &Url) -> Option<String> {
    let target = target.trim();

    if target.is_empty() || target.starts_with('#') {
        return None;
    }

    let lowered = target.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(target).ok()?;
    normalize_url(absolute.as_str()).ok().map(String::from)
}
