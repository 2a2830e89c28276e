//! Pattern-based extraction of candidate details from resume text

use crate::error::{Result, ScreeningError};
use crate::processing::timeline::{EmploymentGap, GapAnalyzer};
use aho_corasick::{AhoCorasick, MatchKind};
use log::{debug, error, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

const QUALIFICATION_VOCABULARY: &[&str] = &[
    "B.Sc", "BSc", "B.Tech", "B.E", "B.A", "M.Sc", "MSc", "M.Tech", "MBA", "MCA", "BCA",
    "Bachelor", "Master", "Ph.D", "PhD", "Diploma", "Associate",
];

const SKILL_VOCABULARY: &[&str] = &[
    "Python", "Java", "JavaScript", "TypeScript", "C++", "C#", "Rust", "Golang", "Ruby", "PHP",
    "Swift", "Kotlin", "Scala", "SQL", "NoSQL", "PostgreSQL", "MySQL", "MongoDB", "Redis",
    "HTML", "CSS", "React", "Angular", "Vue", "Node.js", "Django", "Flask", "Spring", ".NET",
    "AWS", "Azure", "GCP", "Docker", "Kubernetes", "Terraform", "Git", "Linux", "Kafka",
    "Spark", "Hadoop", "TensorFlow", "PyTorch", "Pandas", "NumPy", "Machine Learning",
    "Deep Learning", "Excel", "Tableau", "Power BI", "Jira",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateField {
    FullName,
    Email,
    Phone,
    Qualification,
    KnowledgeSkill,
}

impl fmt::Display for CandidateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateField::FullName => write!(f, "full_name"),
            CandidateField::Email => write!(f, "email"),
            CandidateField::Phone => write!(f, "phone"),
            CandidateField::Qualification => write!(f, "qualification"),
            CandidateField::KnowledgeSkill => write!(f, "knowledge_skill"),
        }
    }
}

/// Best-effort candidate details. Empty strings mean nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFields {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub qualification: String,
    pub knowledge_skill: String,
}

impl CandidateFields {
    pub fn set(&mut self, field: CandidateField, value: String) {
        match field {
            CandidateField::FullName => self.full_name = value,
            CandidateField::Email => self.email = value,
            CandidateField::Phone => self.phone = value,
            CandidateField::Qualification => self.qualification = value,
            CandidateField::KnowledgeSkill => self.knowledge_skill = value,
        }
    }

    pub fn get(&self, field: CandidateField) -> &str {
        match field {
            CandidateField::FullName => &self.full_name,
            CandidateField::Email => &self.email,
            CandidateField::Phone => &self.phone,
            CandidateField::Qualification => &self.qualification,
            CandidateField::KnowledgeSkill => &self.knowledge_skill,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.full_name.is_empty()
            && self.email.is_empty()
            && self.phone.is_empty()
            && self.qualification.is_empty()
            && self.knowledge_skill.is_empty()
    }
}

/// Candidate fields plus the employment timeline derived from the same text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeProfile {
    #[serde(flatten)]
    pub fields: CandidateFields,
    pub experience: Vec<String>,
    pub employment_gaps: Vec<EmploymentGap>,
}

/// One extraction rule per field, so a rule can be swapped for a better one
/// (for example a model-based recognizer) without touching the pipeline.
pub trait FieldRule: Send + Sync {
    fn field(&self) -> CandidateField;

    /// `Ok(None)` when the text holds nothing for this field.
    fn extract(&self, text: &str) -> Result<Option<String>>;
}

/// First line-start run of two to four capitalized words.
pub struct NameRule {
    regex: Regex,
}

impl Default for NameRule {
    fn default() -> Self {
        Self::new()
    }
}

impl NameRule {
    pub fn new() -> Self {
        let regex = Regex::new(r"(?m)^[ \t]*([A-Z][a-zA-Z'-]+(?:[ \t]+[A-Z][a-zA-Z'-]+){1,3})")
            .expect("Invalid name regex");
        Self { regex }
    }
}

impl FieldRule for NameRule {
    fn field(&self) -> CandidateField {
        CandidateField::FullName
    }

    fn extract(&self, text: &str) -> Result<Option<String>> {
        Ok(self
            .regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string()))
    }
}

/// First regex match anywhere in the text.
pub struct FirstMatchRule {
    field: CandidateField,
    regex: Regex,
}

impl FirstMatchRule {
    pub fn new(field: CandidateField, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| ScreeningError::Processing(format!("Invalid pattern for {}: {}", field, e)))?;
        Ok(Self { field, regex })
    }

    pub fn email() -> Self {
        Self {
            field: CandidateField::Email,
            regex: Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
                .expect("Invalid email regex"),
        }
    }

    /// Tolerates a country code, parentheses, and `-`, `.` or space separators.
    pub fn phone() -> Self {
        Self {
            field: CandidateField::Phone,
            regex: Regex::new(
                r"(?:\+\d{1,3}[\s.-]?)?(?:\(\d{2,4}\)|\d{2,4})[\s.-]?\d{3,4}[\s.-]?\d{3,4}",
            )
            .expect("Invalid phone regex"),
        }
    }
}

impl FieldRule for FirstMatchRule {
    fn field(&self) -> CandidateField {
        self.field
    }

    fn extract(&self, text: &str) -> Result<Option<String>> {
        Ok(self.regex.find(text).map(|m| m.as_str().trim().to_string()))
    }
}

/// Word-bounded matches against a closed vocabulary, joined with `", "`.
///
/// Terms outside the vocabulary are never found.
pub struct VocabularyRule {
    field: CandidateField,
    matcher: AhoCorasick,
    vocabulary: Vec<String>,
    deduplicate: bool,
}

impl VocabularyRule {
    pub fn new(
        field: CandidateField,
        vocabulary: Vec<String>,
        case_insensitive: bool,
        deduplicate: bool,
    ) -> Result<Self> {
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(case_insensitive)
            .match_kind(MatchKind::LeftmostLongest)
            .build(&vocabulary)
            .map_err(|e| ScreeningError::Processing(format!("Failed to build {} matcher: {}", field, e)))?;

        Ok(Self {
            field,
            matcher,
            vocabulary,
            deduplicate,
        })
    }

    /// Degree abbreviations; case-sensitive, every occurrence kept as written.
    pub fn qualifications() -> Result<Self> {
        Self::new(
            CandidateField::Qualification,
            QUALIFICATION_VOCABULARY.iter().map(|s| s.to_string()).collect(),
            false,
            false,
        )
    }

    /// Languages and tools; case-insensitive, deduplicated, canonical spelling.
    pub fn skills() -> Result<Self> {
        Self::new(
            CandidateField::KnowledgeSkill,
            SKILL_VOCABULARY.iter().map(|s| s.to_string()).collect(),
            true,
            true,
        )
    }

    fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        !before.is_some_and(|c| c.is_alphanumeric()) && !after.is_some_and(|c| c.is_alphanumeric())
    }
}

impl FieldRule for VocabularyRule {
    fn field(&self) -> CandidateField {
        self.field
    }

    fn extract(&self, text: &str) -> Result<Option<String>> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for mat in self.matcher.find_iter(text) {
            if !Self::is_word_boundary(text, mat.start(), mat.end()) {
                continue;
            }

            if self.deduplicate {
                let canonical = &self.vocabulary[mat.pattern().as_usize()];
                if seen.insert(canonical.to_lowercase()) {
                    found.push(canonical.clone());
                }
            } else {
                found.push(text[mat.start()..mat.end()].to_string());
            }
        }

        Ok((!found.is_empty()).then(|| found.join(", ")))
    }
}

/// Runs every field rule plus the employment timeline over resume text.
pub struct FieldExtractor {
    rules: Vec<Box<dyn FieldRule>>,
    gap_analyzer: GapAnalyzer,
}

impl FieldExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            rules: vec![
                Box::new(NameRule::new()),
                Box::new(FirstMatchRule::email()),
                Box::new(FirstMatchRule::phone()),
                Box::new(VocabularyRule::qualifications()?),
                Box::new(VocabularyRule::skills()?),
            ],
            gap_analyzer: GapAnalyzer::new(),
        })
    }

    /// Replaces the rule for the same field, or adds it if none exists.
    pub fn with_rule(mut self, rule: impl FieldRule + 'static) -> Self {
        let field = rule.field();
        self.rules.retain(|r| r.field() != field);
        self.rules.push(Box::new(rule));
        self
    }

    pub fn with_gap_analyzer(mut self, gap_analyzer: GapAnalyzer) -> Self {
        self.gap_analyzer = gap_analyzer;
        self
    }

    /// Each rule runs independently; a failing rule leaves only its own field empty.
    pub fn extract_candidate_fields(&self, text: &str) -> CandidateFields {
        let mut fields = CandidateFields::default();

        for rule in &self.rules {
            match rule.extract(text) {
                Ok(Some(value)) => fields.set(rule.field(), value),
                Ok(None) => debug!("No match for {}", rule.field()),
                Err(e) => warn!("Extraction of {} failed: {}", rule.field(), e),
            }
        }

        fields
    }

    /// Never panics: anything unexpected yields an empty profile.
    pub fn extract_fields(&self, text: &str) -> ResumeProfile {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let fields = self.extract_candidate_fields(text);
            let history = self.gap_analyzer.analyze(text);
            ResumeProfile {
                fields,
                experience: history.experience,
                employment_gaps: history.employment_gaps,
            }
        }));

        outcome.unwrap_or_else(|_| {
            error!("Field extraction aborted unexpectedly; returning empty profile");
            ResumeProfile::default()
        })
    }
}
