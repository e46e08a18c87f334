use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_harvester::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Extracts the authority used for same-site checks: the host, plus the port
/// when one is given explicitly
///
/// Default ports are dropped by the URL parser, so `https://example.com:443/`
/// and `https://example.com/` share an authority while `example.com:8080`
/// does not.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_harvester::url::extract_authority;
///
/// let url = Url::parse("http://127.0.0.1:8080/page").unwrap();
/// assert_eq!(extract_authority(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_authority(url: &Url) -> Option<String> {
    let host = extract_domain(url)?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}
