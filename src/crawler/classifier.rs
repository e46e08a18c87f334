//! File classification by URL extension
//!
//! A URL's category depends only on the suffix of the last path segment; the
//! query string and fragment never take part.

use crate::config::FileTypesConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Category of a downloadable file, which is also its storage subdirectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Images,
    Documents,
    Videos,
}

impl FileCategory {
    /// All categories, in directory-creation order
    pub const ALL: [FileCategory; 3] = [Self::Images, Self::Documents, Self::Videos];

    /// Name of the subdirectory files of this category are stored in
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::Documents => "documents",
            Self::Videos => "videos",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Maps URL extensions to file categories
#[derive(Debug, Clone)]
pub struct FileClassifier {
    rules: Vec<(FileCategory, Vec<String>)>,
}

impl FileClassifier {
    /// Builds a classifier from the configured extension lists
    pub fn new(config: &FileTypesConfig) -> Self {
        let lower = |exts: &[String]| -> Vec<String> {
            exts.iter().map(|e| e.to_lowercase()).collect()
        };

        Self {
            rules: vec![
                (FileCategory::Images, lower(&config.images)),
                (FileCategory::Documents, lower(&config.documents)),
                (FileCategory::Videos, lower(&config.videos)),
            ],
        }
    }

    /// Returns the category of a URL, or `None` for pages and unknown types
    ///
    /// # Examples
    ///
    /// ```
    /// use site_harvester::config::FileTypesConfig;
    /// use site_harvester::crawler::{FileCategory, FileClassifier};
    ///
    /// let classifier = FileClassifier::new(&FileTypesConfig::default());
    /// assert_eq!(
    ///     classifier.classify("https://example.com/Report.PDF?v=2"),
    ///     Some(FileCategory::Documents)
    /// );
    /// assert_eq!(classifier.classify("https://example.com/archive.zip"), None);
    /// ```
    pub fn classify(&self, url: &str) -> Option<FileCategory> {
        let parsed = Url::parse(url).ok()?;
        self.classify_url(&parsed)
    }

    /// Same as [`FileClassifier::classify`] for an already parsed URL
    pub fn classify_url(&self, url: &Url) -> Option<FileCategory> {
        let ext = path_extension(url.path())?;

        self.rules
            .iter()
            .find(|(_, exts)| exts.iter().any(|e| *e == ext))
            .map(|(category, _)| *category)
    }
}

/// Lowercase extension (with the dot) of the last segment of a URL path
///
/// A segment made only of a leading dot and a name, like `.profile`, has no
/// extension.
pub fn path_extension(path: &str) -> Option<String> {
    let segment = path.rsplit('/').next().unwrap_or(path);
    let (stem, ext) = segment.rsplit_once('.')?;

    if stem.trim_start_matches('.').is_empty() || ext.is_empty() {
        return None;
    }

    Some(format!(".{}", ext.to_lowercase()))
}
