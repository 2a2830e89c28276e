//! Report structures for screening and extraction runs

use crate::processing::fields::ResumeProfile;
use crate::processing::screener::{ScreeningResult, ScreeningStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Results of screening one or more resumes against a single job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningReport {
    pub metadata: ReportMetadata,
    pub job_requirements: String,
    pub results: Vec<ScreeningResult>,
}

/// Text and fields pulled from a single resume, without scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub metadata: ReportMetadata,
    pub source: String,
    pub character_count: usize,
    pub text: String,
    pub profile: ResumeProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub tool_version: String,
    pub embedding_model: Option<String>,
    pub processing_time_ms: u64,
}

impl ReportMetadata {
    pub fn new(embedding_model: Option<String>, processing_time_ms: u64) -> Self {
        Self {
            generated_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            embedding_model,
            processing_time_ms,
        }
    }
}

impl ScreeningReport {
    pub fn new(metadata: ReportMetadata, job_requirements: String, results: Vec<ScreeningResult>) -> Self {
        Self {
            metadata,
            job_requirements,
            results,
        }
    }

    pub fn processed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.screening_status == ScreeningStatus::Processed)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.processed_count()
    }

    /// Highest score first; failed documents last.
    pub fn ranked(&self) -> Vec<&ScreeningResult> {
        let mut ranked: Vec<&ScreeningResult> = self.results.iter().collect();
        ranked.sort_by(|a, b| {
            let a_failed = a.screening_status == ScreeningStatus::Failed;
            let b_failed = b.screening_status == ScreeningStatus::Failed;
            a_failed
                .cmp(&b_failed)
                .then_with(|| b.score.total_cmp(&a.score))
        });
        ranked
    }
}

impl ExtractionReport {
    pub fn new(metadata: ReportMetadata, source: String, text: String, profile: ResumeProfile) -> Self {
        Self {
            metadata,
            source,
            character_count: text.chars().count(),
            text,
            profile,
        }
    }
}
