//! Resume-to-job semantic similarity scoring

use crate::error::Result;
use crate::processing::embeddings::{cosine_similarity, SentenceEncoder};
use log::{debug, warn};
use std::sync::Arc;

/// Scores resume text against job requirements as a percentage in `[0, 100]`.
#[derive(Clone)]
pub struct SimilarityScorer {
    encoder: Arc<dyn SentenceEncoder>,
}

impl SimilarityScorer {
    pub fn new(encoder: Arc<dyn SentenceEncoder>) -> Self {
        Self { encoder }
    }

    /// Empty input on either side scores 0 without touching the encoder.
    /// Encoder failures also score 0: a scoring error counts as "no match".
    pub fn score(&self, resume_text: &str, job_requirements: &str) -> f64 {
        if resume_text.trim().is_empty() || job_requirements.trim().is_empty() {
            return 0.0;
        }

        match self.try_score(resume_text, job_requirements) {
            Ok(score) => score,
            Err(e) => {
                warn!("Similarity scoring failed: {}", e);
                0.0
            }
        }
    }

    fn try_score(&self, resume_text: &str, job_requirements: &str) -> Result<f64> {
        let resume_embedding = self.encoder.encode(resume_text)?;
        let job_embedding = self.encoder.encode(job_requirements)?;

        let similarity = f64::from(cosine_similarity(&resume_embedding, &job_embedding)?);
        if !similarity.is_finite() {
            warn!("Similarity is not a finite number; scoring as 0");
            return Ok(0.0);
        }

        let score = to_percentage(similarity);
        debug!("Similarity {:.4} -> score {:.2} ({})", similarity, score, self.encoder.name());
        Ok(score)
    }
}

/// Cosine similarity to a two-decimal percentage clamped to `[0, 100]`.
fn to_percentage(similarity: f64) -> f64 {
    let percentage = (similarity * 100.0).clamp(0.0, 100.0);
    (percentage * 100.0).round() / 100.0
}
