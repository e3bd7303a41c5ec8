use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use paragraph_aligner::alignment::report::AsParagraphAlignment;
use paragraph_aligner::{
    AlignerConfig, BatchOptions, BatchReport, Paragraph, ParagraphAlignerBuilder,
    ParagraphOutcome, SegmentChunk, Transcript,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[path = "paragraph_report/json_report_formatter.rs"]
mod json_report_formatter;

use json_report_formatter::{Meta, Report, SCHEMA_VERSION};

#[derive(Debug, Parser)]
#[command(name = "paragraph_report")]
#[command(about = "Align paragraphs onto a transcript or subtitle track and write a JSON report")]
struct Args {
    #[arg(long, env = "PARAGRAPH_ALIGN_PARAGRAPHS")]
    paragraphs: PathBuf,
    #[arg(
        long,
        env = "PARAGRAPH_ALIGN_TRANSCRIPT",
        conflicts_with = "subtitles",
        required_unless_present = "subtitles"
    )]
    transcript: Option<PathBuf>,
    #[arg(long, env = "PARAGRAPH_ALIGN_SUBTITLES")]
    subtitles: Option<PathBuf>,
    #[arg(long, env = "PARAGRAPH_ALIGN_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "PARAGRAPH_ALIGN_WORKERS")]
    workers: Option<usize>,
    /// Fail when any paragraph is left unmatched.
    #[arg(long, env = "PARAGRAPH_ALIGN_STRICT", default_value_t = false)]
    strict: bool,
    #[arg(long, env = "PARAGRAPH_ALIGN_OUT")]
    out: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ParagraphFile {
    paragraphs: Vec<ParagraphEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ParagraphEntry {
    Text(String),
    Indexed {
        text: String,
        paragraph_index: Option<usize>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AlignerConfig::load(path).map_err(|err| err.to_string())?,
        None => AlignerConfig::default(),
    };
    let aligner = ParagraphAlignerBuilder::new(config.clone())
        .build()
        .map_err(|err| err.to_string())?;

    let mut options = BatchOptions::default();
    if let Some(workers) = args.workers {
        if workers == 0 {
            return Err("--workers must be >= 1.".to_string());
        }
        options = options.with_max_workers(workers);
    }

    let paragraphs = load_paragraphs(&args.paragraphs)?;
    tracing::info!(paragraphs = paragraphs.len(), "loaded paragraphs");
    let progress = progress_bar(paragraphs.len());

    match (&args.transcript, &args.subtitles) {
        (Some(path), None) => {
            let transcript: Transcript = read_json(path, "transcript")?;
            let report = aligner.align_batch_with_progress(
                &paragraphs,
                &transcript,
                &options,
                |outcome| tick(&progress, outcome),
            );
            progress.finish_with_message("done");
            let meta = meta(
                "transcript",
                paragraphs.len(),
                transcript.segments().len(),
                transcript.words().len(),
                config,
            );
            finish(report, meta, args.strict, args.out.as_deref())
        }
        (None, Some(path)) => {
            let segments: Vec<SegmentChunk> = read_json(path, "subtitles")?;
            let report = aligner.align_subtitle_batch_with_progress(
                &paragraphs,
                &segments,
                &options,
                |outcome| tick(&progress, outcome),
            );
            progress.finish_with_message("done");
            let meta = meta("subtitles", paragraphs.len(), segments.len(), 0, config);
            finish(report, meta, args.strict, args.out.as_deref())
        }
        _ => Err("Exactly one of --transcript or --subtitles is required.".to_string()),
    }
}

fn finish<T>(
    report: BatchReport<T>,
    meta: Meta,
    strict: bool,
    out: Option<&Path>,
) -> Result<(), String>
where
    T: Serialize + Clone + AsParagraphAlignment,
{
    tracing::info!(
        matched = report.counts.matched,
        unmatched = report.counts.unmatched,
        failed = report.counts.failed,
        "alignment finished"
    );
    if strict {
        report.clone().into_strict().map_err(|err| err.to_string())?;
    }
    let report = Report {
        schema_version: SCHEMA_VERSION,
        meta,
        report,
    };
    json_report_formatter::write_report(out, &report)?;
    if let Some(path) = out {
        println!("{}", path.display());
    }
    Ok(())
}

fn meta(
    source: &'static str,
    paragraph_count: usize,
    segment_count: usize,
    word_count: usize,
    config: AlignerConfig,
) -> Meta {
    Meta {
        generated_at: Utc::now().to_rfc3339(),
        source,
        paragraph_count,
        segment_count,
        word_count,
        config,
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let progress = ProgressBar::new(len as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    progress.set_message("aligning...");
    progress
}

fn tick<T>(progress: &ProgressBar, outcome: &ParagraphOutcome<T>) {
    progress.set_message(format!("paragraph {}", outcome.paragraph_index()));
    progress.inc(1);
}

fn load_paragraphs(path: &Path) -> Result<Vec<Paragraph>, String> {
    let file: ParagraphFile = read_json(path, "paragraphs")?;
    Ok(file
        .paragraphs
        .into_iter()
        .enumerate()
        .map(|(position, entry)| match entry {
            ParagraphEntry::Text(text) => Paragraph::new(position, text),
            ParagraphEntry::Indexed {
                text,
                paragraph_index,
            } => Paragraph::new(paragraph_index.unwrap_or(position), text),
        })
        .collect())
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {what} file '{}': {err}", path.display()))?;
    serde_json::from_str(&raw)
        .map_err(|err| format!("Failed to parse {what} JSON '{}': {err}", path.display()))
}
