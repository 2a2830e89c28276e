//! CLI interface for the resume screener

use crate::config::OutputFormat;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// File extensions accepted as resumes.
pub const RESUME_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

#[derive(Parser)]
#[command(name = "resume-screener")]
#[command(about = "Screen resumes against job requirements")]
#[command(long_about = "Extract text from PDF/DOC/DOCX resumes, score them against job requirements with sentence embeddings, and report candidate details and employment gaps")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Screen a single resume against a job description
    Screen {
        /// Resume path (relative to the storage root) or http(s) URL
        #[arg(short, long)]
        resume: String,

        /// Path to job description text file
        #[arg(short, long)]
        job: PathBuf,

        /// Required qualification, appended to the job text
        #[arg(long)]
        qualification: Option<String>,

        /// Required experience, appended to the job text
        #[arg(long)]
        experience: Option<String>,

        /// Required knowledge or skills, appended to the job text
        #[arg(long)]
        knowledge: Option<String>,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Show extracted fields and full timeline
        #[arg(short, long)]
        detailed: bool,
    },

    /// Screen every resume in a directory
    Batch {
        /// Directory containing PDF/DOC/DOCX resumes
        #[arg(long)]
        dir: PathBuf,

        /// Path to job description text file
        #[arg(short, long)]
        job: PathBuf,

        /// Required qualification, appended to the job text
        #[arg(long)]
        qualification: Option<String>,

        /// Required experience, appended to the job text
        #[arg(long)]
        experience: Option<String>,

        /// Required knowledge or skills, appended to the job text
        #[arg(long)]
        knowledge: Option<String>,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Resumes processed at once (defaults to the configured value)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Extract text, candidate fields and employment history without scoring
    Extract {
        /// Resume path (relative to the storage root) or http(s) URL
        #[arg(short, long)]
        resume: String,

        /// Date that "Present" resolves to (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date)]
        as_of: Option<NaiveDate>,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Include the extracted text
        #[arg(short, long)]
        detailed: bool,
    },

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file path
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {} (expected YYYY-MM-DD)", value, e))
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
