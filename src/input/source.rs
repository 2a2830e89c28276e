//! Where resume documents come from

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "location", rename_all = "snake_case")]
pub enum DocumentSource {
    /// Remote document fetched over HTTP(S).
    Url(String),
    /// Key resolved through a [`DocumentStore`].
    Stored(String),
}

impl DocumentSource {
    pub fn parse(reference: &str) -> Self {
        let trimmed = reference.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DocumentSource::Url(trimmed.to_string())
        } else {
            DocumentSource::Stored(trimmed.to_string())
        }
    }

    pub fn location(&self) -> &str {
        match self {
            DocumentSource::Url(url) => url,
            DocumentSource::Stored(key) => key,
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.location())
    }
}

/// Storage abstraction that maps keys to readable local files.
pub trait DocumentStore: Send + Sync {
    /// Returns `None` when the key does not name an existing file.
    fn resolve(&self, key: &str) -> Option<PathBuf>;
}

/// Resolves keys against a root directory. Absolute keys are used as-is.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DocumentStore for LocalStore {
    fn resolve(&self, key: &str) -> Option<PathBuf> {
        let key_path = Path::new(key);
        let path = if key_path.is_absolute() {
            key_path.to_path_buf()
        } else {
            // Relative keys must stay under the root.
            if key_path.components().any(|c| matches!(c, Component::ParentDir)) {
                return None;
            }
            self.root.join(key_path)
        };

        path.is_file().then_some(path)
    }
}
