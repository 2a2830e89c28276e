//! Resolves a document source and turns it into normalized text

use crate::config::ExtractionConfig;
use crate::error::{Result, ScreeningError};
use crate::input::file_detector::DocumentKind;
use crate::input::source::{DocumentSource, DocumentStore, LocalStore};
use crate::input::text_extractor::{DocumentParser, PdfParser, TextNormalizer, WordParser};
use log::{debug, info, warn};
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Document text extractor.
///
/// Every public entry point degrades to an empty string on failure and logs the
/// reason, so one unreadable resume never stops a batch.
pub struct TextExtractor {
    store: Arc<dyn DocumentStore>,
    client: reqwest::Client,
    deadline: Duration,
    download_dir: Option<PathBuf>,
    normalizer: TextNormalizer,
}

impl TextExtractor {
    pub fn new(store: Arc<dyn DocumentStore>, config: &ExtractionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()?;

        Ok(Self {
            store,
            client,
            deadline: Duration::from_secs(config.document_deadline_secs),
            download_dir: config.download_dir.clone(),
            normalizer: TextNormalizer::new(),
        })
    }

    /// Extractor backed by a [`LocalStore`] rooted at `config.storage_root`.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let store = Arc::new(LocalStore::new(config.storage_root.clone()));
        Self::new(store, config)
    }

    pub async fn extract_text(&self, source: &DocumentSource) -> String {
        match tokio::time::timeout(self.deadline, self.try_extract(source)).await {
            Ok(Ok(text)) => {
                if text.is_empty() {
                    warn!("No text extracted from {}", source);
                } else {
                    info!("Extracted {} characters from {}", text.len(), source);
                }
                text
            }
            Ok(Err(e)) => {
                warn!("Failed to extract text from {}: {}", source, e);
                String::new()
            }
            Err(_) => {
                warn!(
                    "Extraction of {} exceeded the {:?} deadline",
                    source, self.deadline
                );
                String::new()
            }
        }
    }

    /// Extracts text from bytes already in memory.
    pub async fn extract_bytes(&self, bytes: Vec<u8>, kind: DocumentKind) -> String {
        match self.parse_bytes(bytes, kind).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to extract text from in-memory document: {}", e);
                String::new()
            }
        }
    }

    async fn try_extract(&self, source: &DocumentSource) -> Result<String> {
        match source {
            DocumentSource::Url(url) => self.extract_remote(url).await,
            DocumentSource::Stored(key) => self.extract_stored(key).await,
        }
    }

    async fn extract_stored(&self, key: &str) -> Result<String> {
        let path = self.store.resolve(key).ok_or_else(|| {
            ScreeningError::InvalidInput(format!("Document not found in storage: {}", key))
        })?;

        let kind = DocumentKind::from_path(&path);
        self.extract_file(&path, kind).await
    }

    async fn extract_remote(&self, url: &str) -> Result<String> {
        let kind = DocumentKind::from_url(url);
        if !kind.is_supported() {
            return Err(ScreeningError::UnsupportedFormat(format!(
                "Unsupported document type '.{}' for {}",
                kind.extension(),
                url
            )));
        }

        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ScreeningError::Network(format!(
                "{} returned HTTP {}",
                url, status
            )));
        }
        let bytes = response.bytes().await?;

        // Removed when the guard drops, whichever way this function exits.
        let suffix = format!(".{}", kind.extension());
        let mut builder = tempfile::Builder::new();
        builder.prefix("resume-").suffix(&suffix);
        let temp = match &self.download_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        tokio::fs::write(temp.path(), &bytes).await?;

        self.extract_file(temp.path(), kind).await
    }

    async fn extract_file(&self, path: &Path, kind: DocumentKind) -> Result<String> {
        if !kind.is_supported() {
            return Err(ScreeningError::UnsupportedFormat(format!(
                "Unsupported document type '.{}' for {}",
                kind.extension(),
                path.display()
            )));
        }

        let bytes = tokio::fs::read(path).await?;
        info!("Extracting text from {:?} document: {}", kind, path.display());
        self.parse_bytes(bytes, kind).await
    }

    async fn parse_bytes(&self, bytes: Vec<u8>, kind: DocumentKind) -> Result<String> {
        let raw = tokio::task::spawn_blocking(move || match kind {
            DocumentKind::Pdf => PdfParser.parse(&bytes),
            DocumentKind::Doc | DocumentKind::Docx => WordParser.parse(&bytes),
            DocumentKind::Unsupported(ext) => Err(ScreeningError::UnsupportedFormat(format!(
                "Unsupported document type '.{}'",
                ext
            ))),
        })
        .await
        .map_err(|e| ScreeningError::Processing(format!("Extraction task failed: {}", e)))??;

        Ok(self.normalizer.normalize(&raw))
    }
}
