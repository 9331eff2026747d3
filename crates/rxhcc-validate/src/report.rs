//! Validation report output.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use serde::Serialize;

use crate::batch::{BatchSummary, RecordResult};

const REPORT_SCHEMA: &str = "rxhcc.validation-report";
const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct ValidationReportPayload<'a> {
    schema: &'static str,
    schema_version: u32,
    generated_at: String,
    summary: &'a BatchSummary,
    records: &'a [RecordResult],
}

/// Writes the versioned JSON report for one batch run and returns its
/// path.
pub fn write_validation_report_json(
    output_dir: &Path,
    summary: &BatchSummary,
    records: &[RecordResult],
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output dir: {}", output_dir.display()))?;
    let output_path = output_dir.join("validation_report.json");
    let payload = ValidationReportPayload {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        summary,
        records,
    };
    let json = serde_json::to_string_pretty(&payload)?;
    fs::write(&output_path, format!("{json}\n"))
        .with_context(|| format!("Failed to write report: {}", output_path.display()))?;
    Ok(output_path)
}

/// Writes the validated DataFrame (original columns plus the appended
/// result columns) as CSV and returns its path.
pub fn write_validated_csv(output_dir: &Path, df: &mut DataFrame) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output dir: {}", output_dir.display()))?;
    let output_path = output_dir.join("validated_claims.csv");
    let mut file = fs::File::create(&output_path)
        .with_context(|| format!("Failed to create: {}", output_path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("Failed to write CSV: {}", output_path.display()))?;
    Ok(output_path)
}
