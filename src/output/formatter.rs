//! Output formatters: console, JSON, and Markdown

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::{ExtractionReport, ScreeningReport};
use crate::processing::fields::{CandidateField, CandidateFields, ResumeProfile};
use crate::processing::screener::{ScreeningResult, ScreeningStatus};
use crate::processing::timeline::EmploymentGap;
use colored::{Color, Colorize};
use std::path::Path;

const FIELD_ORDER: [(CandidateField, &str); 5] = [
    (CandidateField::FullName, "Name"),
    (CandidateField::Email, "Email"),
    (CandidateField::Phone, "Phone"),
    (CandidateField::Qualification, "Qualification"),
    (CandidateField::KnowledgeSkill, "Skills"),
];

pub trait OutputFormatter {
    fn format_screening(&self, report: &ScreeningReport) -> Result<String>;
    fn format_extraction(&self, report: &ExtractionReport) -> Result<String>;
}

/// Colored terminal output
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter;

/// Picks the formatter for the requested format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: f64) -> String {
        let (badge, color) = match score {
            s if s >= 80.0 => ("STRONG", Color::Green),
            s if s >= 60.0 => ("GOOD", Color::BrightGreen),
            s if s >= 40.0 => ("PARTIAL", Color::Yellow),
            _ => ("WEAK", Color::Red),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_fields(&self, fields: &CandidateFields) -> String {
        let mut output = String::new();
        for (field, label) in FIELD_ORDER {
            let value = fields.get(field);
            let shown = if value.is_empty() {
                self.colorize("-", Color::BrightBlack)
            } else {
                value.to_string()
            };
            output.push_str(&format!("  {:<14} {}\n", format!("{}:", label), shown));
        }
        output
    }

    fn format_timeline(&self, experience: &[String], gaps: &[EmploymentGap]) -> String {
        let mut output = String::new();
        if experience.is_empty() {
            output.push_str("  No dated job entries found\n");
        }
        for entry in experience {
            output.push_str(&format!("  • {}\n", entry));
        }
        for gap in gaps {
            let line = format!(
                "  ⚠ Gap of {} months ({} → {})",
                gap.duration_months, gap.gap_start, gap.gap_end
            );
            output.push_str(&self.colorize(&line, Color::Yellow));
            output.push('\n');
        }
        output
    }

    fn format_result(&self, rank: usize, result: &ScreeningResult) -> String {
        let mut output = String::new();

        match result.screening_status {
            ScreeningStatus::Processed => {
                output.push_str(&format!(
                    "{}. {} — {:.2}% {}\n",
                    rank,
                    result.source,
                    result.score,
                    self.format_score_badge(result.score)
                ));
            }
            ScreeningStatus::Failed => {
                output.push_str(&format!(
                    "{}. {} — {}\n",
                    rank,
                    result.source,
                    self.colorize("FAILED (unreadable document)", Color::Red)
                ));
                return output;
            }
        }

        if self.detailed {
            output.push_str(&self.format_fields(&result.extracted_fields));
            output.push_str(&self.format_timeline(&result.experience, &result.employment_gaps));
        } else {
            if !result.extracted_fields.full_name.is_empty() {
                output.push_str(&format!("  {}\n", result.extracted_fields.full_name));
            }
            if !result.employment_gaps.is_empty() {
                let line = format!("  {} employment gap(s) over threshold", result.employment_gaps.len());
                output.push_str(&self.colorize(&line, Color::Yellow));
                output.push('\n');
            }
        }

        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_screening(&self, report: &ScreeningReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("RESUME SCREENING", 1));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.processing_time_ms
        ));
        if let Some(model) = &report.metadata.embedding_model {
            output.push_str(&format!("Embedding model: {}\n", model));
        }
        output.push_str(&format!(
            "Documents: {} processed, {} failed\n",
            report.processed_count(),
            report.failed_count()
        ));

        output.push_str(&self.format_header("Ranking", 2));
        for (i, result) in report.ranked().into_iter().enumerate() {
            output.push_str(&self.format_result(i + 1, result));
        }

        Ok(output)
    }

    fn format_extraction(&self, report: &ExtractionReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("RESUME EXTRACTION", 1));
        output.push_str(&format!(
            "Source: {} | {} characters\n",
            report.source, report.character_count
        ));

        output.push_str(&self.format_header("Candidate", 2));
        output.push_str(&self.format_fields(&report.profile.fields));

        output.push_str(&self.format_header("Employment History", 2));
        output.push_str(&self.format_timeline(&report.profile.experience, &report.profile.employment_gaps));

        if self.detailed {
            output.push_str(&self.format_header("Extracted Text", 3));
            output.push_str(&report.text);
            output.push('\n');
        }

        Ok(output)
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_screening(&self, report: &ScreeningReport) -> Result<String> {
        self.to_json(report)
    }

    fn format_extraction(&self, report: &ExtractionReport) -> Result<String> {
        self.to_json(report)
    }
}

impl MarkdownFormatter {
    fn fields_table(fields: &CandidateFields) -> String {
        let mut output = String::from("| Field | Value |\n|---|---|\n");
        for (field, label) in FIELD_ORDER {
            output.push_str(&format!("| {} | {} |\n", label, Self::escape(fields.get(field))));
        }
        output
    }

    fn timeline(profile_experience: &[String], gaps: &[EmploymentGap]) -> String {
        let mut output = String::new();
        for entry in profile_experience {
            output.push_str(&format!("- {}\n", entry));
        }
        if !gaps.is_empty() {
            output.push_str("\n**Employment gaps**\n\n");
            for gap in gaps {
                output.push_str(&format!(
                    "- {} → {} ({} months)\n",
                    gap.gap_start, gap.gap_end, gap.duration_months
                ));
            }
        }
        output
    }

    fn escape(value: &str) -> String {
        value.replace('|', "\\|")
    }

    fn profile_section(profile: &ResumeProfile) -> String {
        format!(
            "{}\n{}",
            Self::fields_table(&profile.fields),
            Self::timeline(&profile.experience, &profile.employment_gaps)
        )
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_screening(&self, report: &ScreeningReport) -> Result<String> {
        let mut output = String::from("# Resume Screening Report\n\n");
        output.push_str(&format!(
            "_Generated {} · {} processed · {} failed_\n\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M UTC"),
            report.processed_count(),
            report.failed_count()
        ));

        output.push_str("| Rank | Document | Score | Status | Gaps |\n|---|---|---|---|---|\n");
        for (i, result) in report.ranked().into_iter().enumerate() {
            output.push_str(&format!(
                "| {} | {} | {:.2} | {} | {} |\n",
                i + 1,
                Self::escape(&result.source),
                result.score,
                result.screening_status,
                result.employment_gaps.len()
            ));
        }

        for result in report.ranked() {
            if result.screening_status == ScreeningStatus::Failed {
                continue;
            }
            output.push_str(&format!("\n## {}\n\n", result.source));
            output.push_str(&Self::fields_table(&result.extracted_fields));
            output.push('\n');
            output.push_str(&Self::timeline(&result.experience, &result.employment_gaps));
        }

        Ok(output)
    }

    fn format_extraction(&self, report: &ExtractionReport) -> Result<String> {
        let mut output = format!("# Resume Extraction: {}\n\n", report.source);
        output.push_str(&Self::profile_section(&report.profile));
        Ok(output)
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true)
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter,
        }
    }

    fn formatter(&self, format: OutputFormat) -> &dyn OutputFormatter {
        match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
        }
    }

    pub fn screening(&self, report: &ScreeningReport, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_screening(report)
    }

    pub fn extraction(&self, report: &ExtractionReport, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_extraction(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::report::ReportMetadata;

    fn sample_report() -> ScreeningReport {
        let mut fields = CandidateFields::default();
        fields.full_name = "Jane Smith".to_string();
        fields.knowledge_skill = "Rust, Kafka".to_string();

        ScreeningReport::new(
            ReportMetadata::new(Some("test-encoder".to_string()), 12),
            "Rust engineer".to_string(),
            vec![ScreeningResult {
                source: "jane.pdf".to_string(),
                score: 72.5,
                screening_status: ScreeningStatus::Processed,
                employment_gaps: vec![EmploymentGap {
                    gap_start: "2019-12".to_string(),
                    gap_end: "2020-07".to_string(),
                    duration_months: 7,
                }],
                extracted_fields: fields,
                experience: vec!["Engineer at Acme (Jan 2018 - Dec 2019)".to_string()],
            }],
        )
    }

    #[test]
    fn test_console_output_without_colors() {
        let output = ConsoleFormatter::new(false, true)
            .format_screening(&sample_report())
            .unwrap();

        assert!(output.contains("jane.pdf — 72.50% [GOOD]"));
        assert!(output.contains("Gap of 7 months (2019-12 → 2020-07)"));
        assert!(output.contains("Rust, Kafka"));
    }

    #[test]
    fn test_json_output_round_trips() {
        let output = JsonFormatter::new(false).format_screening(&sample_report()).unwrap();
        let parsed: ScreeningReport = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed.results[0].score, 72.5);
        assert_eq!(parsed.results[0].employment_gaps[0].duration_months, 7);
    }

    #[test]
    fn test_markdown_output_has_table() {
        let output = ReportGenerator::new()
            .screening(&sample_report(), OutputFormat::Markdown)
            .unwrap();

        assert!(output.contains("| 1 | jane.pdf | 72.50 | processed | 1 |"));
        assert!(output.contains("- 2019-12 → 2020-07 (7 months)"));
    }
}
