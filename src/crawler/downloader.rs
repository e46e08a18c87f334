//! File downloader
//!
//! Downloads classified resources into `<run dir>/<category>/<file name>` and
//! persists the report after every successful write.

use crate::crawler::classifier::FileClassifier;
use crate::crawler::fetcher::{fetch_url, FetchResult};
use crate::output::{DownloadRecord, ResultStore};
use crate::HarvestError;
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use url::Url;

/// Writes downloadable resources to disk
pub struct Downloader {
    client: Client,
    classifier: FileClassifier,
    run_dir: PathBuf,
    store: Arc<ResultStore>,

    /// File paths handed out in this run, and the URL each one belongs to
    claimed: Mutex<HashMap<PathBuf, String>>,
}

impl Downloader {
    pub fn new(
        client: Client,
        classifier: FileClassifier,
        run_dir: impl Into<PathBuf>,
        store: Arc<ResultStore>,
    ) -> Self {
        Self {
            client,
            classifier,
            run_dir: run_dir.into(),
            store,
            claimed: Mutex::new(HashMap::new()),
        }
    }

    /// Downloads `url` if it maps to a file category
    ///
    /// Returns `None` for unclassified URLs and for every failure; failures
    /// are logged with the URL and never propagate.
    pub async fn download(&self, url: &str) -> Option<DownloadRecord> {
        // Unclassified URLs are not an error, just not ours to fetch
        self.classifier.classify(url)?;

        match self.try_download(url).await {
            Ok(record) => {
                tracing::info!("Downloaded: {}", url);

                if let Err(e) = self.store.persist().await {
                    tracing::warn!("Failed to save report after downloading {}: {}", url, e);
                }
                Some(record)
            }
            Err(e) => {
                tracing::error!("Error downloading {}: {}", url, e);
                None
            }
        }
    }

    async fn try_download(&self, url: &str) -> Result<DownloadRecord, HarvestError> {
        let parsed = Url::parse(url)?;
        let category =
            self.classifier
                .classify_url(&parsed)
                .ok_or_else(|| HarvestError::InvalidFileName {
                    url: url.to_string(),
                })?;

        let body = match fetch_url(&self.client, url).await {
            FetchResult::Success { body, .. } => body,
            FetchResult::HttpError { status_code } => {
                return Err(HarvestError::HttpStatus {
                    url: url.to_string(),
                    status: status_code,
                })
            }
            FetchResult::NetworkError { source } => {
                return Err(HarvestError::Http {
                    url: url.to_string(),
                    source,
                })
            }
        };

        let file_name = file_name_from_url(&parsed).ok_or_else(|| HarvestError::InvalidFileName {
            url: url.to_string(),
        })?;

        let dir = self.run_dir.join(category.dir_name());
        tokio::fs::create_dir_all(&dir).await?;

        let path = self.claim_path(dir.join(&file_name), url);
        tokio::fs::write(&path, &body).await?;

        Ok(DownloadRecord {
            url: url.to_string(),
            local_path: path.to_string_lossy().into_owned(),
            file_type: category,
            size: body.len() as u64,
        })
    }

    /// Reserves `path` for `url`, renaming it if another URL already holds it
    fn claim_path(&self, path: PathBuf, url: &str) -> PathBuf {
        let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);

        match claimed.get(&path) {
            None => {
                claimed.insert(path.clone(), url.to_string());
                path
            }
            Some(owner) if owner == url => path,
            Some(_) => {
                let mut attempt = 0;
                loop {
                    let alternate = disambiguate(&path, url, attempt);
                    match claimed.get(&alternate) {
                        Some(owner) if owner != url => attempt += 1,
                        _ => {
                            claimed.insert(alternate.clone(), url.to_string());
                            return alternate;
                        }
                    }
                }
            }
        }
    }
}

/// Percent-decoded last path segment of `url`, safe to use as a file name
pub fn file_name_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    let decoded = urlencoding::decode_binary(segment.as_bytes());
    let name = String::from_utf8_lossy(&decoded).replace(['/', '\\'], "_");

    match name.trim() {
        "" | "." | ".." => None,
        _ => Some(name),
    }
}

/// Appends a short hash of `url` to the file stem of `path`
///
/// Attempts past the first add a counter after the hash.
fn disambiguate(path: &Path, url: &str, attempt: usize) -> PathBuf {
    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    let tag = match attempt {
        0 => digest[..8].to_string(),
        n => format!("{}_{}", &digest[..8], n),
    };

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, tag, ext.to_string_lossy()),
        None => format!("{}_{}", stem, tag),
    };

    path.with_file_name(name)
}
