//! Text extraction from PDF and Word documents

use crate::error::{Result, ScreeningError};
use log::{debug, warn};
use regex::Regex;
use std::panic::{self, AssertUnwindSafe};

pub trait DocumentParser {
    fn parse(&self, bytes: &[u8]) -> Result<String>;
}

/// Layout-aware PDF extraction with `pdf-extract`, falling back to page-by-page
/// `lopdf` extraction when the primary pass fails or finds no text.
pub struct PdfParser;

impl DocumentParser for PdfParser {
    fn parse(&self, bytes: &[u8]) -> Result<String> {
        match Self::extract_layout(bytes) {
            Ok(text) if !text.trim().is_empty() => return Ok(text),
            Ok(_) => debug!("Primary PDF extraction found no text, trying fallback"),
            Err(e) => debug!("Primary PDF extraction failed ({}), trying fallback", e),
        }

        Self::extract_pages(bytes)
    }
}

impl PdfParser {
    /// Breaks lines where the text position moves down the page.
    fn extract_layout(bytes: &[u8]) -> Result<String> {
        // pdf-extract panics on some malformed inputs.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)));

        match outcome {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ScreeningError::PdfExtraction(format!(
                "Layout extraction failed: {}",
                e
            ))),
            Err(_) => Err(ScreeningError::PdfExtraction(
                "Layout extraction panicked".to_string(),
            )),
        }
    }

    fn extract_pages(bytes: &[u8]) -> Result<String> {
        let doc = lopdf::Document::load_mem(bytes)?;
        let pages = doc.get_pages();
        let mut text = String::new();

        for page_num in pages.keys() {
            match doc.extract_text(&[*page_num]) {
                Ok(page_text) => {
                    text.push_str(&page_text);
                    text.push('\n');
                }
                Err(e) => {
                    warn!("Failed to extract text from PDF page {}: {}", page_num, e);
                }
            }
        }

        Ok(text)
    }
}

/// Paragraph-by-paragraph extraction from Office Open XML documents.
pub struct WordParser;

impl DocumentParser for WordParser {
    fn parse(&self, bytes: &[u8]) -> Result<String> {
        let docx = docx_rs::read_docx(bytes)
            .map_err(|e| ScreeningError::DocxExtraction(format!("Failed to read document: {}", e)))?;

        let mut paragraphs = Vec::new();
        for child in docx.document.children {
            if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
                let mut line = String::new();
                for paragraph_child in paragraph.children {
                    if let docx_rs::ParagraphChild::Run(run) = paragraph_child {
                        for run_child in run.children {
                            match run_child {
                                docx_rs::RunChild::Text(t) => line.push_str(&t.text),
                                docx_rs::RunChild::Tab(_) => line.push('\t'),
                                _ => {}
                            }
                        }
                    }
                }
                paragraphs.push(line);
            }
        }

        Ok(paragraphs.join("\n"))
    }
}

/// Cleans raw extractor output into a single line of text.
pub struct TextNormalizer {
    timestamp_regex: Regex,
    whitespace_regex: Regex,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    pub fn new() -> Self {
        // Print/OCR stamps at a line start, such as "3/14/24, 10:32 AM" or
        // "2024-03-14 10:32:05". Only the stamp goes; the rest of the line stays.
        let timestamp_regex = Regex::new(
            r"(?m)^[ \t]*(?:\d{1,2}/\d{1,2}/\d{2,4},?[ \t]+\d{1,2}:\d{2}(?::\d{2})?(?:[ \t]*[AaPp][Mm]\b)?|\d{4}-\d{2}-\d{2}[ T]\d{2}:\d{2}(?::\d{2})?)",
        )
        .expect("Invalid timestamp regex");

        let whitespace_regex = Regex::new(r"\s+").expect("Invalid whitespace regex");

        Self {
            timestamp_regex,
            whitespace_regex,
        }
    }

    pub fn normalize(&self, text: &str) -> String {
        let unicode = Self::normalize_unicode(text);
        let without_stamps = self.timestamp_regex.replace_all(&unicode, "");
        self.whitespace_regex
            .replace_all(&without_stamps, " ")
            .trim()
            .to_string()
    }

    fn normalize_unicode(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '\u{2018}' | '\u{2019}' => out.push('\''),
                '\u{201C}' | '\u{201D}' => out.push('"'),
                '\u{00A0}' => out.push(' '),
                '\u{FB01}' => out.push_str("fi"),
                '\u{FB02}' => out.push_str("fl"),
                '\u{0000}' => {}
                _ => out.push(c),
            }
        }
        out
    }
}
