//! End-to-end screening of resumes against job requirements

use crate::input::{DocumentSource, TextExtractor};
use crate::processing::fields::{CandidateFields, FieldExtractor, ResumeProfile};
use crate::processing::scorer::SimilarityScorer;
use crate::processing::timeline::EmploymentGap;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// The job-side text a resume is scored against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequirements {
    pub description: String,
    pub qualification: String,
    pub experience: String,
    pub knowledge: String,
}

impl JobRequirements {
    pub fn from_description(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    /// Non-empty parts joined by single spaces.
    pub fn to_text(&self) -> String {
        [&self.description, &self.qualification, &self.experience, &self.knowledge]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningStatus {
    Processed,
    Failed,
}

impl fmt::Display for ScreeningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreeningStatus::Processed => write!(f, "processed"),
            ScreeningStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Per-document outcome handed back to the calling workflow.
///
/// Gaps involving a `Present` role depend on the date of screening, so they are
/// only valid as of that date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub source: String,
    pub score: f64,
    pub screening_status: ScreeningStatus,
    pub employment_gaps: Vec<EmploymentGap>,
    pub extracted_fields: CandidateFields,
    pub experience: Vec<String>,
}

impl ScreeningResult {
    pub fn failed(source: &DocumentSource) -> Self {
        Self {
            source: source.to_string(),
            score: 0.0,
            screening_status: ScreeningStatus::Failed,
            employment_gaps: Vec::new(),
            extracted_fields: CandidateFields::default(),
            experience: Vec::new(),
        }
    }

    fn processed(source: &DocumentSource, score: f64, profile: ResumeProfile) -> Self {
        Self {
            source: source.to_string(),
            score,
            screening_status: ScreeningStatus::Processed,
            employment_gaps: profile.employment_gaps,
            extracted_fields: profile.fields,
            experience: profile.experience,
        }
    }
}

/// Extract, score and profile resumes. Cheap to clone; all parts are shared.
#[derive(Clone)]
pub struct Screener {
    extractor: Arc<TextExtractor>,
    scorer: SimilarityScorer,
    fields: Arc<FieldExtractor>,
}

impl Screener {
    pub fn new(extractor: TextExtractor, scorer: SimilarityScorer, fields: FieldExtractor) -> Self {
        Self {
            extractor: Arc::new(extractor),
            scorer,
            fields: Arc::new(fields),
        }
    }

    pub async fn screen(&self, source: &DocumentSource, requirements: &JobRequirements) -> ScreeningResult {
        let text = self.extractor.extract_text(source).await;
        if text.is_empty() {
            warn!("Screening failed for {}: no readable text", source);
            return ScreeningResult::failed(source);
        }

        self.screen_text(source, text, requirements.to_text()).await
    }

    /// Screens already-extracted text.
    pub async fn screen_text(&self, source: &DocumentSource, text: String, requirements: String) -> ScreeningResult {
        let scorer = self.scorer.clone();
        let fields = Arc::clone(&self.fields);

        let analysis = tokio::task::spawn_blocking(move || {
            let score = scorer.score(&text, &requirements);
            let profile = fields.extract_fields(&text);
            (score, profile)
        })
        .await;

        match analysis {
            Ok((score, profile)) => {
                info!(
                    "Screened {}: score {:.2}, {} roles, {} gaps",
                    source,
                    score,
                    profile.experience.len(),
                    profile.employment_gaps.len()
                );
                ScreeningResult::processed(source, score, profile)
            }
            Err(e) => {
                error!("Screening task for {} failed: {}", source, e);
                ScreeningResult::failed(source)
            }
        }
    }

    /// Screens many resumes with at most `concurrency` in flight.
    /// Results come back in input order.
    pub async fn screen_batch(
        &self,
        sources: Vec<DocumentSource>,
        requirements: &JobRequirements,
        concurrency: usize,
    ) -> Vec<ScreeningResult> {
        self.screen_batch_with_progress(sources, requirements, concurrency, |_| {})
            .await
    }

    /// Like [`screen_batch`](Self::screen_batch), calling `on_done` as each resume finishes.
    pub async fn screen_batch_with_progress<F>(
        &self,
        sources: Vec<DocumentSource>,
        requirements: &JobRequirements,
        concurrency: usize,
        mut on_done: F,
    ) -> Vec<ScreeningResult>
    where
        F: FnMut(&ScreeningResult),
    {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (index, source) in sources.iter().cloned().enumerate() {
            let screener = self.clone();
            let requirements = requirements.clone();
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => screener.screen(&source, &requirements).await,
                    Err(_) => ScreeningResult::failed(&source),
                };
                (index, result)
            });
        }

        let mut results: Vec<Option<ScreeningResult>> = vec![None; sources.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => {
                    on_done(&result);
                    results[index] = Some(result);
                }
                Err(e) => error!("Batch screening task failed: {}", e),
            }
        }

        results
            .into_iter()
            .zip(sources.iter())
            .map(|(result, source)| result.unwrap_or_else(|| ScreeningResult::failed(source)))
            .collect()
    }
}
