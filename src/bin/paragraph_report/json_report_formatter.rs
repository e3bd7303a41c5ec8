use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use paragraph_aligner::{AlignerConfig, BatchReport};
use serde::Serialize;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub source: &'static str,
    pub paragraph_count: usize,
    pub segment_count: usize,
    pub word_count: usize,
    pub config: AlignerConfig,
}

#[derive(Debug, Serialize)]
pub struct Report<T> {
    pub schema_version: u32,
    pub meta: Meta,
    pub report: BatchReport<T>,
}

/// Writes the report as pretty JSON to `path`, or to stdout when no path is
/// given.
pub fn write_report<T: Serialize>(path: Option<&Path>, report: &Report<T>) -> Result<(), String> {
    let Some(path) = path else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        serde_json::to_writer_pretty(&mut handle, report)
            .map_err(|err| format!("Failed to serialize report JSON to stdout: {err}"))?;
        handle
            .write_all(b"\n")
            .map_err(|err| format!("Failed to finalize report on stdout: {err}"))?;
        return Ok(());
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create report output directory '{}': {err}",
                parent.display()
            )
        })?;
    }

    let mut file = File::create(path)
        .map_err(|err| format!("Failed to create report file '{}': {err}", path.display()))?;
    serde_json::to_writer_pretty(&mut file, report).map_err(|err| {
        format!(
            "Failed to serialize report JSON '{}': {err}",
            path.display()
        )
    })?;
    file.write_all(b"\n")
        .map_err(|err| format!("Failed to finalize report file '{}': {err}", path.display()))?;
    Ok(())
}
