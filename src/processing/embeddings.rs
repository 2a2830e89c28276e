//! Sentence embeddings using Model2Vec

use crate::config::EmbeddingConfig;
use crate::error::{Result, ScreeningError};
use log::info;
use model2vec_rs::model::StaticModel;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Turns text into a fixed-size vector. Implementations must be immutable
/// after construction so one instance can serve concurrent callers.
pub trait SentenceEncoder: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<f32>>;

    fn name(&self) -> &str;
}

/// Pretrained Model2Vec static embedding model, loaded once and shared.
pub struct EmbeddingModel {
    model: StaticModel,
    model_name: String,
}

impl EmbeddingModel {
    /// Loads from a local directory or downloads from the HuggingFace Hub.
    ///
    /// Failure here is fatal for screening: without a model nothing can be scored.
    pub fn load(config: &EmbeddingConfig) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading embedding model: {}", config.model);

        let model = StaticModel::from_pretrained(&config.model, None, config.normalize, None)
            .map_err(|e: anyhow::Error| {
                ScreeningError::ModelLoading(format!("Failed to load model '{}': {:#}", config.model, e))
            })?;

        info!("Embedding model loaded in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            model_name: config.model.clone(),
        })
    }
}

impl SentenceEncoder for EmbeddingModel {
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.model.encode_single(text)));
        let embedding = outcome
            .map_err(|_| ScreeningError::Embedding("Model panicked while encoding".to_string()))?;

        if embedding.is_empty() {
            return Err(ScreeningError::Embedding("Model returned an empty vector".to_string()));
        }
        Ok(embedding)
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

/// Cosine similarity in `[-1, 1]`; zero vectors give 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(ScreeningError::Embedding(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    if a.is_empty() {
        return Ok(0.0);
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot_product / (norm_a * norm_b))
    }
}
