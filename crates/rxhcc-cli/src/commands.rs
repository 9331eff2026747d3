use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value;

use rxhcc_ingest::{raw_record_from_row, read_claims_csv};
use rxhcc_standards::RuleCatalog;
use rxhcc_validate::{
    BatchSummary, PipelineOutcome, RecordResult, SynthOptions, SyntheticClaimGenerator,
    ValidationPipeline, summarize, validate_dataframe, validate_records, write_validated_csv,
    write_validation_report_json,
};

use crate::cli::{BatchArgs, ClaimArgs, GenerateArgs};

const CSV_COLUMNS: [&str; 9] = [
    "claim_id",
    "patient_id",
    "icd_codes",
    "ndc_codes",
    "hcc_codes",
    "provider_id",
    "claim_date",
    "claim_amount",
    "anomaly_type",
];

pub struct BatchResult {
    pub summary: BatchSummary,
    pub results: Vec<RecordResult>,
}

impl BatchResult {
    pub fn has_flagged_claims(&self) -> bool {
        self.summary.flagged_claims > 0
    }
}

pub fn run_batch(args: &BatchArgs) -> Result<BatchResult> {
    let df = read_claims_csv(&args.input)?;
    tracing::info!(
        claims = df.height(),
        input = %args.input.display(),
        "loaded claims file"
    );
    let raws: Vec<Value> = (0..df.height())
        .map(|idx| raw_record_from_row(&df, idx))
        .collect();
    let pipeline = ValidationPipeline::new();
    let results = validate_records(&pipeline, &raws);
    let summary = summarize(&results);
    if let Some(output_dir) = &args.output_dir {
        let mut validated =
            validate_dataframe(pipeline.engine(), &df).context("Failed to annotate claims")?;
        let csv_path = write_validated_csv(output_dir, &mut validated)?;
        let report_path = write_validation_report_json(output_dir, &summary, &results)?;
        tracing::info!(
            csv = %csv_path.display(),
            report = %report_path.display(),
            "wrote batch outputs"
        );
    }
    Ok(BatchResult { summary, results })
}

pub fn run_claim(args: &ClaimArgs) -> Result<PipelineOutcome> {
    let text = if args.input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read claim from stdin")?;
        buffer
    } else {
        fs::read_to_string(&args.input)
            .with_context(|| format!("Failed to read: {}", args.input))?
    };
    let raw: Value =
        serde_json::from_str(&text).context("Claim input is not valid JSON")?;
    let pipeline = ValidationPipeline::new();
    Ok(pipeline.run(&raw))
}

pub fn run_rules() -> RuleCatalog {
    RuleCatalog::builtin()
}

pub fn run_generate(args: &GenerateArgs) -> Result<usize> {
    if !(0.0..=1.0).contains(&args.anomaly_rate) {
        bail!("--anomaly-rate must be between 0.0 and 1.0");
    }
    let options = SynthOptions {
        records: args.records,
        anomaly_rate: args.anomaly_rate,
        seed: args.seed,
    };
    let mut generator = SyntheticClaimGenerator::new(args.seed);
    let records = generator.generate(&options);
    write_claims_csv(&args.output, &records)?;
    Ok(records.len())
}

fn write_claims_csv(path: &Path, records: &[Value]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output dir: {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create: {}", path.display()))?;
    writer.write_record(CSV_COLUMNS)?;
    for record in records {
        let row: Vec<String> = CSV_COLUMNS
            .iter()
            .map(|column| field_text(record, column))
            .collect();
        writer.write_record(&row)?;
    }
    writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

fn field_text(record: &Value, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    }
}
