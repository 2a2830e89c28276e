//! Resume screener library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod processing;
pub mod output;

pub use config::Config;
pub use error::{Result, ScreeningError};
pub use input::{DocumentKind, DocumentSource, DocumentStore, LocalStore, TextExtractor};
pub use processing::embeddings::{EmbeddingModel, SentenceEncoder};
pub use processing::fields::{CandidateFields, FieldExtractor, FieldRule, ResumeProfile};
pub use processing::scorer::SimilarityScorer;
pub use processing::screener::{JobRequirements, Screener, ScreeningResult, ScreeningStatus};
pub use processing::timeline::{EmploymentGap, EmploymentHistory, GapAnalyzer, JobEntry};
