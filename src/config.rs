//! Configuration management for the resume screener

use crate::error::{Result, ScreeningError};
use crate::processing::timeline::DEFAULT_GAP_THRESHOLD_MONTHS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Sentence-embedding model used when none is configured.
pub const DEFAULT_EMBEDDING_MODEL: &str = "minishlab/potion-base-8M";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub embedding: EmbeddingConfig,
    pub extraction: ExtractionConfig,
    pub screening: ScreeningConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// HuggingFace repo id or path to a local model directory.
    pub model: String,
    pub device: String,
    /// Overrides the model's own normalization setting when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalize: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Root directory that storage keys are resolved against.
    pub storage_root: PathBuf,
    pub fetch_timeout_secs: u64,
    pub document_deadline_secs: u64,
    /// Where downloaded documents are staged; the system temp dir when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningConfig {
    pub gap_threshold_months: u32,
    pub concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            embedding: EmbeddingConfig {
                model: DEFAULT_EMBEDDING_MODEL.to_string(),
                device: "cpu".to_string(),
                normalize: None,
            },
            extraction: ExtractionConfig {
                storage_root: PathBuf::from("."),
                fetch_timeout_secs: 10,
                document_deadline_secs: 30,
                download_dir: None,
            },
            screening: ScreeningConfig {
                gap_threshold_months: DEFAULT_GAP_THRESHOLD_MONTHS,
                concurrency: 4,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults there on first use.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| ScreeningError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ScreeningError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-screener")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if !self.embedding.device.eq_ignore_ascii_case("cpu") {
            return Err(ScreeningError::Configuration(format!(
                "Unsupported compute device '{}': only 'cpu' is available",
                self.embedding.device
            )));
        }
        if self.embedding.model.trim().is_empty() {
            return Err(ScreeningError::Configuration(
                "embedding.model must not be empty".to_string(),
            ));
        }
        if self.screening.concurrency == 0 {
            return Err(ScreeningError::Configuration(
                "screening.concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
