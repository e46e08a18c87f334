//! Page rendering
//!
//! The crawler does not interpret raw responses itself: a [`PageRenderer`]
//! turns a URL into text content and an optional title. The default
//! [`HttpRenderer`] fetches the page and renders its HTML as markdown-flavoured
//! text, keeping links as `[label](href)` and images as `![alt](src)` so the
//! link extractor can find them.

use crate::crawler::fetcher::{fetch_url, FetchResult};
use crate::HarvestError;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Node, Selector};

/// Output of a renderer for one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    /// Rendered text content
    pub content: String,

    /// Page title, if the page has one
    pub title: Option<String>,

    /// URL the content was served from after redirects; relative links
    /// resolve against it
    pub final_url: Option<String>,
}

/// Turns a URL into rendered page content
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Renders the page at `url`
    ///
    /// Any failure is returned as an error; the caller decides how to absorb it.
    async fn render(&self, url: &str) -> Result<RenderedPage, HarvestError>;
}

/// Renderer that fetches pages over HTTP and renders their HTML
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &str) -> Result<RenderedPage, HarvestError> {
        match fetch_url(&self.client, url).await {
            FetchResult::Success {
                final_url,
                content_type,
                body,
                ..
            } => {
                let media_type = content_type.to_ascii_lowercase();
                if !is_textual(&media_type) {
                    return Err(HarvestError::ContentMismatch {
                        url: url.to_string(),
                        content_type,
                    });
                }

                let text = String::from_utf8_lossy(&body);
                let page = if media_type.contains("html") || media_type.is_empty() {
                    render_html(&text)
                } else {
                    RenderedPage {
                        content: text.into_owned(),
                        ..RenderedPage::default()
                    }
                };
                Ok(RenderedPage {
                    final_url: Some(final_url),
                    ..page
                })
            }
            FetchResult::HttpError { status_code } => Err(HarvestError::HttpStatus {
                url: url.to_string(),
                status: status_code,
            }),
            FetchResult::NetworkError { source } => Err(HarvestError::Http {
                url: url.to_string(),
                source,
            }),
        }
    }
}

/// Returns true for (lowercased) content types the renderer can turn into text
fn is_textual(content_type: &str) -> bool {
    content_type.is_empty()
        || content_type.contains("html")
        || content_type.starts_with("text/")
        || content_type.contains("xml")
}

/// Renders an HTML document into markdown-flavoured text
///
/// # Example
///
/// ```
/// use site_harvester::crawler::render_html;
///
/// let page = render_html(
///     r#"<html><head><title>Home</title></head>
///        <body><p>See <a href="/about">About us</a></p></body></html>"#,
/// );
/// assert_eq!(page.title.as_deref(), Some("Home"));
/// assert!(page.content.contains("[About us](/about)"));
/// ```
pub fn render_html(html: &str) -> RenderedPage {
    let document = Html::parse_document(html);

    let title = Selector::parse("title").ok().and_then(|selector| {
        document
            .select(&selector)
            .next()
            .map(|element| collapse_whitespace(&element.text().collect::<String>()))
            .filter(|s| !s.is_empty())
    });

    let mut out = String::new();
    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next());
    write_children(body.unwrap_or_else(|| document.root_element()), &mut out);

    RenderedPage {
        content: tidy_lines(&out),
        title,
        final_url: None,
    }
}

fn write_children(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_text(out, text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    write_element(child, out);
                }
            }
            _ => {}
        }
    }
}

fn write_element(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();

    match name {
        "head" | "script" | "style" | "noscript" | "template" | "svg" => {}
        "br" => out.push('\n'),
        "a" => {
            let label = link_label(element);
            match element.value().attr("href").map(str::trim) {
                Some(href) if !href.is_empty() => {
                    out.push_str(&format!("[{}]({})", label, escape_target(href)));
                }
                _ => push_text(out, &label),
            }
            write_wrapped_images(element, out);
        }
        "img" => {
            if let Some(src) = element.value().attr("src").map(str::trim) {
                if !src.is_empty() {
                    let alt = element.value().attr("alt").unwrap_or("");
                    out.push_str(&format!(
                        "![{}]({})",
                        clean_label(alt),
                        escape_target(src)
                    ));
                }
            }
        }
        "video" | "audio" | "source" | "embed" | "iframe" => {
            if let Some(src) = element.value().attr("src").map(str::trim) {
                if !src.is_empty() {
                    out.push_str(&format!("[{}]({})", name, escape_target(src)));
                }
            }
            write_children(element, out);
        }
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<usize>().unwrap_or(1);
            out.push_str("\n\n");
            out.push_str(&"#".repeat(level));
            out.push(' ');
            write_children(element, out);
            out.push_str("\n\n");
        }
        "li" => {
            out.push_str("\n- ");
            write_children(element, out);
            out.push('\n');
        }
        "p" | "div" | "section" | "article" | "header" | "footer" | "nav" | "main" | "ul"
        | "ol" | "table" | "tr" | "blockquote" | "pre" | "form" => {
            out.push_str("\n\n");
            write_children(element, out);
            out.push_str("\n\n");
        }
        "td" | "th" => {
            write_children(element, out);
            out.push_str(" | ");
        }
        _ => write_children(element, out),
    }
}

/// Emits `![alt](src)` for every image inside a link, after the link itself
fn write_wrapped_images(anchor: ElementRef<'_>, out: &mut String) {
    let Ok(selector) = Selector::parse("img[src]") else {
        return;
    };

    for img in anchor.select(&selector) {
        let src = img.value().attr("src").map(str::trim).unwrap_or("");
        if src.is_empty() {
            continue;
        }
        let alt = img.value().attr("alt").unwrap_or("");
        out.push_str(&format!(" ![{}]({})", clean_label(alt), escape_target(src)));
    }
}

/// Label of a link: its text, or the alt text of an image inside it
fn link_label(element: ElementRef<'_>) -> String {
    let text = collapse_whitespace(&element.text().collect::<String>());
    if !text.is_empty() {
        return clean_label(&text);
    }

    Selector::parse("img[alt]")
        .ok()
        .and_then(|selector| element.select(&selector).next())
        .and_then(|img| img.value().attr("alt"))
        .map(clean_label)
        .unwrap_or_default()
}

/// Removes characters that would end a markdown label early
fn clean_label(label: &str) -> String {
    label.replace(|c| c == '[' || c == ']', "")
}

/// Encodes characters that would end a markdown link target early
fn escape_target(target: &str) -> String {
    target
        .replace(' ', "%20")
        .replace('(', "%28")
        .replace(')', "%29")
}

fn push_text(out: &mut String, text: &str) {
    let collapsed = collapse_whitespace(text);
    if collapsed.is_empty() {
        if !text.is_empty() && !out.ends_with([' ', '\n']) {
            out.push(' ');
        }
        return;
    }

    if text.starts_with(char::is_whitespace) && !out.ends_with([' ', '\n']) && !out.is_empty() {
        out.push(' ');
    }
    out.push_str(&collapsed);
    if text.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trims every line and collapses runs of blank lines into one
fn tidy_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() && lines.last().map_or(true, |prev| prev.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
