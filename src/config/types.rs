use serde::Deserialize;

/// Main configuration structure for Site-Harvester
///
/// Every section is optional in the TOML file; missing sections and keys fall
/// back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub scope: ScopeConfig,
    #[serde(rename = "file-types")]
    pub file_types: FileTypesConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of pages fetched concurrently in one batch
    #[serde(rename = "batch-width")]
    pub batch_width: usize,

    /// Pause between two batches (milliseconds)
    #[serde(rename = "batch-delay-ms")]
    pub batch_delay_ms: u64,

    /// Soft ceiling on the number of visited pages
    #[serde(rename = "max-pages")]
    pub max_pages: Option<usize>,

    /// Timeout applied to every page and file request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            batch_width: 5,
            batch_delay_ms: 1000,
            max_pages: None,
            request_timeout_secs: 30,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SiteHarvester".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory under which the per-run directory is created
    #[serde(rename = "output-root")]
    pub output_root: String,

    /// Suffix of the per-run directory (`<domain>_<suffix>`)
    #[serde(rename = "download-dir-suffix")]
    pub download_dir_suffix: String,

    /// Name of the JSON report written at the root of the run directory
    #[serde(rename = "report-file-name")]
    pub report_file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_root: "./sample_result".to_string(),
            download_dir_suffix: "downloads".to_string(),
            report_file_name: "crawler_results.json".to_string(),
        }
    }
}

/// Navigation scope configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Path suffixes that are never crawled as pages
    #[serde(rename = "excluded-extensions")]
    pub excluded_extensions: Vec<String>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            excluded_extensions: vec![".gif".to_string(), ".zip".to_string()],
        }
    }
}

/// Extension lists for each downloadable file category
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileTypesConfig {
    pub images: Vec<String>,
    pub documents: Vec<String>,
    pub videos: Vec<String>,
}

impl Default for FileTypesConfig {
    fn default() -> Self {
        fn list(exts: &[&str]) -> Vec<String> {
            exts.iter().map(|e| e.to_string()).collect()
        }

        Self {
            images: list(&[".jpg", ".jpeg", ".png", ".webp"]),
            documents: list(&[".pdf", ".doc", ".docx", ".xlsx", ".xls", ".ppt", ".pptx"]),
            videos: list(&[".mp4", ".avi", ".mov", ".wmv"]),
        }
    }
}
