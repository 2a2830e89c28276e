//! Scoring, field extraction, and employment timeline analysis

pub mod embeddings;
pub mod scorer;
pub mod fields;
pub mod timeline;
pub mod screener;
