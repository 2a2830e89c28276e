//! Document type detection

use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Doc,
    Docx,
    Unsupported(String),
}

impl DocumentKind {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => DocumentKind::Pdf,
            "doc" => DocumentKind::Doc,
            "docx" => DocumentKind::Docx,
            other => DocumentKind::Unsupported(other.to_string()),
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or_else(|| DocumentKind::Unsupported(String::new()))
    }

    /// Extension of the last path segment of a URL, ignoring query and fragment.
    pub fn from_url(url: &str) -> Self {
        let without_query = url.split(['?', '#']).next().unwrap_or(url);
        let last_segment = without_query.rsplit('/').next().unwrap_or("");
        Self::from_path(Path::new(last_segment))
    }

    pub fn extension(&self) -> &str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Doc => "doc",
            DocumentKind::Docx => "docx",
            DocumentKind::Unsupported(ext) => ext,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, DocumentKind::Unsupported(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(DocumentKind::from_extension("PDF"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_extension("Docx"), DocumentKind::Docx);
        assert_eq!(DocumentKind::from_extension("doc"), DocumentKind::Doc);
        assert!(!DocumentKind::from_extension("txt").is_supported());
    }

    #[test]
    fn test_kind_from_url_ignores_query() {
        assert_eq!(
            DocumentKind::from_url("https://cdn.example.com/resumes/jane.pdf?sig=abc#page=2"),
            DocumentKind::Pdf
        );
        assert_eq!(
            DocumentKind::from_url("https://cdn.example.com/resumes/jane"),
            DocumentKind::Unsupported(String::new())
        );
    }
}
