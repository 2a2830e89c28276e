//! Input processing module
//! Handles document sources, type detection, and text extraction

pub mod file_detector;
pub mod source;
pub mod text_extractor;
pub mod manager;

pub use file_detector::DocumentKind;
pub use manager::TextExtractor;
pub use source::{DocumentSource, DocumentStore, LocalStore};
