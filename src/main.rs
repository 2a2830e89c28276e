//! Resume screener: score resumes against job requirements

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use resume_screener::cli::{self, Cli, Commands, ConfigAction, RESUME_EXTENSIONS};
use resume_screener::config::{Config, OutputFormat};
use resume_screener::output::{save_report_to_file, ExtractionReport, ReportGenerator, ReportMetadata, ScreeningReport};
use resume_screener::{
    DocumentSource, EmbeddingModel, FieldExtractor, GapAnalyzer, JobRequirements, LocalStore, Result, Screener,
    ScreeningError, SimilarityScorer, TextExtractor,
};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: PathBuf) -> Result<()> {
    match command {
        Commands::Screen {
            resume,
            job,
            qualification,
            experience,
            knowledge,
            output,
            save,
            detailed,
        } => {
            let output_format = resolve_format(output.as_deref(), &config)?;
            let source = parse_resume_source(&resume)?;

            let requirements = read_requirements(&job, qualification, experience, knowledge).await?;

            eprintln!("🚀 Resume screening");
            eprintln!("📄 Resume: {}", source);
            eprintln!("💼 Job Description: {}", job.display());

            let start_time = Instant::now();
            let extractor = TextExtractor::from_config(&config.extraction)?;
            let (screener, model_name) = build_screener(&config, extractor).await?;

            let result = screener.screen(&source, &requirements).await;
            let report = ScreeningReport::new(
                ReportMetadata::new(Some(model_name), elapsed_ms(start_time)),
                requirements.to_text(),
                vec![result],
            );

            let generator = ReportGenerator::with_options(config.output.color_output, detailed, true);
            let content = generator.screening(&report, output_format)?;
            emit(&content, save.as_deref())?;
        }

        Commands::Batch {
            dir,
            job,
            qualification,
            experience,
            knowledge,
            output,
            save,
            concurrency,
        } => {
            let output_format = resolve_format(output.as_deref(), &config)?;
            let concurrency = concurrency.unwrap_or(config.screening.concurrency).max(1);
            let requirements = read_requirements(&job, qualification, experience, knowledge).await?;

            let files = collect_resumes(&dir)?;
            if files.is_empty() {
                return Err(ScreeningError::InvalidInput(format!(
                    "No PDF/DOC/DOCX resumes found in {}",
                    dir.display()
                )));
            }

            eprintln!("🚀 Batch screening");
            eprintln!("📂 Directory: {} ({} resumes)", dir.display(), files.len());
            eprintln!("💼 Job Description: {}", job.display());

            let start_time = Instant::now();
            let extractor = TextExtractor::new(Arc::new(LocalStore::new(&dir)), &config.extraction)?;
            let (screener, model_name) = build_screener(&config, extractor).await?;

            let progress = ProgressBar::new(files.len() as u64);
            progress.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .map_err(|e| ScreeningError::OutputFormatting(e.to_string()))?
                    .progress_chars("#>-"),
            );

            let sources = files.into_iter().map(DocumentSource::Stored).collect();
            let results = screener
                .screen_batch_with_progress(sources, &requirements, concurrency, |result| {
                    progress.set_message(result.source.clone());
                    progress.inc(1);
                })
                .await;
            progress.finish_with_message("done");

            let report = ScreeningReport::new(
                ReportMetadata::new(Some(model_name), elapsed_ms(start_time)),
                requirements.to_text(),
                results,
            );
            if report.failed_count() > 0 {
                warn!("{} of {} resumes could not be read", report.failed_count(), report.results.len());
            }

            let generator = ReportGenerator::with_options(config.output.color_output, false, true);
            let content = generator.screening(&report, output_format)?;
            emit(&content, save.as_deref())?;
        }

        Commands::Extract {
            resume,
            as_of,
            output,
            detailed,
        } => {
            let output_format = resolve_format(output.as_deref(), &config)?;
            let source = parse_resume_source(&resume)?;

            let start_time = Instant::now();
            let extractor = TextExtractor::from_config(&config.extraction)?;
            let text = extractor.extract_text(&source).await;
            if text.is_empty() {
                return Err(ScreeningError::Processing(format!("No readable text in {}", source)));
            }

            let mut gap_analyzer = GapAnalyzer::new().with_threshold(config.screening.gap_threshold_months);
            if let Some(date) = as_of {
                gap_analyzer = gap_analyzer.with_reference_date(date);
            }
            let fields = FieldExtractor::new()?.with_gap_analyzer(gap_analyzer);
            let profile = fields.extract_fields(&text);

            let report = ExtractionReport::new(
                ReportMetadata::new(None, elapsed_ms(start_time)),
                source.to_string(),
                text,
                profile,
            );

            let generator = ReportGenerator::with_options(config.output.color_output, detailed, true);
            let content = generator.extraction(&report, output_format)?;
            emit(&content, None)?;
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration ({})\n", config_path.display());
                println!("Embedding Model: {}", config.embedding.model);
                println!("Device: {}", config.embedding.device);
                println!("Storage Root: {}", config.extraction.storage_root.display());
                println!("Fetch Timeout: {}s", config.extraction.fetch_timeout_secs);
                println!("Document Deadline: {}s", config.extraction.document_deadline_secs);
                if let Some(dir) = &config.extraction.download_dir {
                    println!("Download Directory: {}", dir.display());
                }
                println!("Gap Threshold: {} months", config.screening.gap_threshold_months);
                println!("Concurrency: {}", config.screening.concurrency);
                println!("Output Format: {:?}", config.output.format);
            }

            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                Config::default().save_to(&config_path)?;
                println!("✅ Configuration reset successfully!");
            }

            Some(ConfigAction::Path) => {
                println!("{}", config_path.display());
            }
        },
    }

    Ok(())
}

/// Loads the embedding model once and wires it into a screener.
async fn build_screener(config: &Config, extractor: TextExtractor) -> Result<(Screener, String)> {
    eprintln!("🧠 Loading embedding model: {}", config.embedding.model);

    let embedding_config = config.embedding.clone();
    let model = tokio::task::spawn_blocking(move || EmbeddingModel::load(&embedding_config))
        .await
        .map_err(|e| ScreeningError::ModelLoading(format!("Model loading task failed: {}", e)))??;
    let model_name = config.embedding.model.clone();

    let gap_analyzer = GapAnalyzer::new().with_threshold(config.screening.gap_threshold_months);
    let fields = FieldExtractor::new()?.with_gap_analyzer(gap_analyzer);
    let scorer = SimilarityScorer::new(Arc::new(model));

    Ok((Screener::new(extractor, scorer, fields), model_name))
}

fn resolve_format(output: Option<&str>, config: &Config) -> Result<OutputFormat> {
    match output {
        Some(format) => cli::parse_output_format(format).map_err(ScreeningError::InvalidInput),
        None => Ok(config.output.format),
    }
}

fn parse_resume_source(resume: &str) -> Result<DocumentSource> {
    let source = DocumentSource::parse(resume);
    if let DocumentSource::Stored(path) = &source {
        cli::validate_file_extension(Path::new(path), &RESUME_EXTENSIONS)
            .map_err(|e| ScreeningError::InvalidInput(format!("Resume file: {}", e)))?;
    }
    Ok(source)
}

async fn read_job_description(path: &Path) -> Result<String> {
    let text = tokio::fs::read_to_string(path).await?;
    if text.trim().is_empty() {
        return Err(ScreeningError::InvalidInput(format!(
            "Job description {} is empty",
            path.display()
        )));
    }
    Ok(text)
}

async fn read_requirements(
    job: &Path,
    qualification: Option<String>,
    experience: Option<String>,
    knowledge: Option<String>,
) -> Result<JobRequirements> {
    let mut requirements = JobRequirements::from_description(read_job_description(job).await?);
    requirements.qualification = qualification.unwrap_or_default();
    requirements.experience = experience.unwrap_or_default();
    requirements.knowledge = knowledge.unwrap_or_default();
    Ok(requirements)
}

/// Resume file names in `dir`, sorted.
fn collect_resumes(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || cli::validate_file_extension(&path, &RESUME_EXTENSIONS).is_err() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            files.push(name.to_string());
        }
    }
    files.sort();
    info!("Found {} resumes in {}", files.len(), dir.display());
    Ok(files)
}

fn emit(content: &str, save: Option<&Path>) -> Result<()> {
    match save {
        Some(path) => {
            save_report_to_file(content, path)?;
            eprintln!("💾 Report saved to {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
