//! Integration tests for the resume screener

use chrono::NaiveDate;
use docx_rs::{Docx, Paragraph, Run};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use resume_screener::config::Config;
use resume_screener::{
    DocumentSource, FieldExtractor, GapAnalyzer, JobRequirements, LocalStore, Result, Screener, ScreeningStatus,
    SentenceEncoder, SimilarityScorer, TextExtractor,
};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const STAMPED_LINES: [&str; 3] = [
    "3/14/24, 10:32 AM Resume - Google Docs",
    "Jane Smith jane@example.com",
    "Engineer at Acme (Jan 2018 - Dec 2019)",
];

const RESUME_LINES: [&str; 6] = [
    "Jane Smith",
    "jane.smith@example.com | +1 555-123-4567",
    "MBA, Bachelor of Science",
    "Skills: Rust, Python, Kafka, rust",
    "Experience: Software Engineer at Acme Corp (Jan 2018 - Dec 2019)",
    "Data Engineer at Beta Labs (Jul 2020 - Present)",
];

/// Hashed bag-of-words vectors; no model download needed.
struct BagOfWords;

impl SentenceEncoder for BagOfWords {
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0; 64];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() % 64) as usize] += 1.0;
        }
        Ok(vector)
    }

    fn name(&self) -> &str {
        "bag-of-words"
    }
}

fn write_docx(path: &Path, lines: &[&str]) {
    let docx = lines.iter().fold(Docx::new(), |docx, line| {
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*line)))
    });
    let file = std::fs::File::create(path).unwrap();
    docx.build().pack(file).unwrap();
}

fn write_pdf(path: &Path, lines: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    // One text object for the whole page, lines placed with relative moves.
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 11.into()]),
        Operation::new("Td", vec![50.into(), 780.into()]),
    ];
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            operations.push(Operation::new("Td", vec![0.into(), (-16).into()]));
        }
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
    }
    operations.push(Operation::new("ET", vec![]));
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

fn extractor_for(root: &Path) -> TextExtractor {
    let mut config = Config::default().extraction;
    config.fetch_timeout_secs = 5;
    TextExtractor::new(Arc::new(LocalStore::new(root)), &config).unwrap()
}

fn screener_for(root: &Path) -> Screener {
    let gap_analyzer = GapAnalyzer::new().with_reference_date(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    let fields = FieldExtractor::new().unwrap().with_gap_analyzer(gap_analyzer);
    Screener::new(extractor_for(root), SimilarityScorer::new(Arc::new(BagOfWords)), fields)
}

fn job() -> JobRequirements {
    JobRequirements {
        description: "Software Engineer building data pipelines".to_string(),
        qualification: "Bachelor".to_string(),
        experience: "5 years".to_string(),
        knowledge: "Rust Kafka".to_string(),
    }
}

/// Minimal HTTP server: each route path gets its body, anything else a 404.
async fn serve_documents(routes: Vec<(&'static str, Vec<u8>)>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            let routes = Arc::clone(&routes);

            tokio::spawn(async move {
                let mut request: Vec<u8> = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let request_line = String::from_utf8_lossy(&request).lines().next().unwrap_or("").to_string();
                let route = routes
                    .iter()
                    .find(|(path, _)| request_line.starts_with(&format!("GET {} ", path)));
                let (status, payload): (&str, &[u8]) = match route {
                    Some((_, body)) => ("200 OK", body.as_slice()),
                    None => ("404 Not Found", &b"not found"[..]),
                };

                let header = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status,
                    payload.len()
                );
                let _ = socket.write_all(header.as_bytes()).await;
                let _ = socket.write_all(payload).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

#[tokio::test]
async fn test_docx_text_is_extracted_and_normalized() {
    let temp_dir = TempDir::new().unwrap();
    write_docx(&temp_dir.path().join("jane.docx"), &RESUME_LINES);

    let text = extractor_for(temp_dir.path())
        .extract_text(&DocumentSource::Stored("jane.docx".to_string()))
        .await;

    assert!(text.starts_with("Jane Smith jane.smith@example.com"));
    assert!(text.contains("Software Engineer at Acme Corp (Jan 2018 - Dec 2019)"));
    assert!(!text.contains('\n'));
    assert!(!text.contains("  "));
}

#[tokio::test]
async fn test_pdf_lines_stay_separated() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(&temp_dir.path().join("jane.pdf"), &RESUME_LINES);

    let text = extractor_for(temp_dir.path())
        .extract_text(&DocumentSource::Stored("jane.pdf".to_string()))
        .await;

    assert!(text.starts_with("Jane Smith jane.smith@example.com"));
    assert!(text.contains("(Jan 2018 - Dec 2019) Data Engineer at Beta Labs"));
}

#[tokio::test]
async fn test_pdf_print_stamp_removes_only_the_stamp() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(&temp_dir.path().join("stamped.pdf"), &STAMPED_LINES);

    let text = extractor_for(temp_dir.path())
        .extract_text(&DocumentSource::Stored("stamped.pdf".to_string()))
        .await;

    assert!(!text.contains("3/14/24"));
    assert!(text.starts_with("Resume - Google Docs"));
    assert!(text.contains("Jane Smith jane@example.com Engineer at Acme (Jan 2018 - Dec 2019)"));
}

#[tokio::test]
async fn test_screen_reads_fields_from_pdf() {
    let temp_dir = TempDir::new().unwrap();
    write_pdf(&temp_dir.path().join("jane.pdf"), &RESUME_LINES);

    let result = screener_for(temp_dir.path())
        .screen(&DocumentSource::Stored("jane.pdf".to_string()), &job())
        .await;

    assert_eq!(result.screening_status, ScreeningStatus::Processed);
    assert_eq!(result.extracted_fields.full_name, "Jane Smith");
    assert_eq!(result.extracted_fields.email, "jane.smith@example.com");
    assert_eq!(result.experience.len(), 2);
    assert_eq!(result.employment_gaps[0].duration_months, 7);
}

#[tokio::test]
async fn test_remote_document_is_downloaded() {
    let temp_dir = TempDir::new().unwrap();
    let docx_path = temp_dir.path().join("remote.docx");
    write_docx(&docx_path, &RESUME_LINES);
    let addr = serve_documents(vec![("/resume.docx", std::fs::read(&docx_path).unwrap())]).await;

    let extractor = extractor_for(temp_dir.path());
    let text = extractor
        .extract_text(&DocumentSource::parse(&format!("http://{}/resume.docx", addr)))
        .await;

    assert!(text.contains("Jane Smith"));
}

#[tokio::test]
async fn test_remote_not_found_yields_empty_text() {
    let temp_dir = TempDir::new().unwrap();
    let addr = serve_documents(Vec::new()).await;

    let text = extractor_for(temp_dir.path())
        .extract_text(&DocumentSource::parse(&format!("http://{}/missing.pdf", addr)))
        .await;

    assert_eq!(text, "");
}

#[tokio::test]
async fn test_screen_produces_scored_profile() {
    let temp_dir = TempDir::new().unwrap();
    write_docx(&temp_dir.path().join("jane.docx"), &RESUME_LINES);

    let result = screener_for(temp_dir.path())
        .screen(&DocumentSource::Stored("jane.docx".to_string()), &job())
        .await;

    assert_eq!(result.screening_status, ScreeningStatus::Processed);
    assert!(result.score > 0.0 && result.score <= 100.0);
    assert_eq!(result.score, (result.score * 100.0).round() / 100.0);

    let fields = &result.extracted_fields;
    assert_eq!(fields.full_name, "Jane Smith");
    assert_eq!(fields.email, "jane.smith@example.com");
    assert_eq!(fields.phone, "+1 555-123-4567");
    assert_eq!(fields.qualification, "MBA, Bachelor");
    assert_eq!(fields.knowledge_skill, "Rust, Python, Kafka");

    assert_eq!(
        result.experience,
        vec![
            "Software Engineer at Acme Corp (Jan 2018 - Dec 2019)".to_string(),
            "Data Engineer at Beta Labs (Jul 2020 - Present)".to_string(),
        ]
    );
    assert_eq!(result.employment_gaps.len(), 1);
    assert_eq!(result.employment_gaps[0].gap_start, "2019-12");
    assert_eq!(result.employment_gaps[0].gap_end, "2020-07");
    assert_eq!(result.employment_gaps[0].duration_months, 7);
}

#[tokio::test]
async fn test_unreadable_resume_is_marked_failed() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("broken.docx"), b"not a zip archive").unwrap();

    let result = screener_for(temp_dir.path())
        .screen(&DocumentSource::Stored("broken.docx".to_string()), &job())
        .await;

    assert_eq!(result.screening_status, ScreeningStatus::Failed);
    assert_eq!(result.score, 0.0);
    assert!(result.extracted_fields.is_empty());
    assert!(result.employment_gaps.is_empty());
}

#[tokio::test]
async fn test_batch_keeps_input_order_and_survives_failures() {
    let temp_dir = TempDir::new().unwrap();
    write_docx(&temp_dir.path().join("a.docx"), &RESUME_LINES);
    write_pdf(&temp_dir.path().join("c.pdf"), &RESUME_LINES);

    let sources = vec![
        DocumentSource::Stored("a.docx".to_string()),
        DocumentSource::Stored("missing.pdf".to_string()),
        DocumentSource::Stored("c.pdf".to_string()),
    ];

    let results = screener_for(temp_dir.path()).screen_batch(sources, &job(), 2).await;

    let order: Vec<&str> = results.iter().map(|r| r.source.as_str()).collect();
    assert_eq!(order, vec!["a.docx", "missing.pdf", "c.pdf"]);
    assert_eq!(results[0].screening_status, ScreeningStatus::Processed);
    assert_eq!(results[1].screening_status, ScreeningStatus::Failed);
    assert_eq!(results[2].screening_status, ScreeningStatus::Processed);
}

#[tokio::test]
async fn test_empty_requirements_score_zero() {
    let temp_dir = TempDir::new().unwrap();
    let screener = screener_for(temp_dir.path());

    let result = screener
        .screen_text(
            &DocumentSource::Stored("inline".to_string()),
            RESUME_LINES.join(" "),
            JobRequirements::default().to_text(),
        )
        .await;

    assert_eq!(result.screening_status, ScreeningStatus::Processed);
    assert_eq!(result.score, 0.0);
    assert_eq!(result.extracted_fields.full_name, "Jane Smith");
}

#[tokio::test]
async fn test_downloads_are_removed_after_extraction() {
    let temp_dir = TempDir::new().unwrap();
    let download_dir = TempDir::new().unwrap();
    let docx_path = temp_dir.path().join("remote.docx");
    write_docx(&docx_path, &RESUME_LINES);

    let addr = serve_documents(vec![
        ("/resume.docx", std::fs::read(&docx_path).unwrap()),
        ("/broken.pdf", b"%PDF-1.4 truncated".to_vec()),
    ])
    .await;

    let mut config = Config::default().extraction;
    config.download_dir = Some(download_dir.path().to_path_buf());
    let extractor = TextExtractor::new(Arc::new(LocalStore::new(temp_dir.path())), &config).unwrap();

    let good = extractor
        .extract_text(&DocumentSource::parse(&format!("http://{}/resume.docx", addr)))
        .await;
    let broken = extractor
        .extract_text(&DocumentSource::parse(&format!("http://{}/broken.pdf", addr)))
        .await;

    assert!(good.contains("Jane Smith"));
    assert_eq!(broken, "");
    let leftovers: Vec<_> = std::fs::read_dir(download_dir.path()).unwrap().collect();
    assert!(leftovers.is_empty(), "staged downloads left behind: {:?}", leftovers);
}
