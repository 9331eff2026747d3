//! Batch validation: applies the pipeline across a record collection and
//! aggregates summary statistics.
//!
//! Per-record evaluation is pure and independent, so the batch loop is
//! embarrassingly parallel: records are chunked across a scoped worker
//! pool sized to the available cores. Output order matches input order;
//! no cross-record state exists.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread;

use polars::prelude::{DataFrame, NamedFrom, PolarsResult, Series};
use serde::Serialize;
use serde_json::Value;

use rxhcc_ingest::{normalize, raw_record_from_row};
use rxhcc_model::{Finding, Severity, max_severity};

use crate::engine::RuleEngine;
use crate::pipeline::{PipelineOutcome, Stage, ValidationPipeline};

/// Per-claim outcome of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct RecordResult {
    pub claim_id: String,
    pub stage: Stage,
    pub findings: Vec<Finding>,
    /// Worst severity observed across the claim's findings.
    pub max_severity: Severity,
    /// True iff the worst severity is WARNING or CRITICAL.
    pub is_flagged: bool,
    pub claim_amount: f64,
    /// Category label carried through from labeled input, when present.
    pub anomaly_type: Option<String>,
}

impl RecordResult {
    fn from_outcome(outcome: PipelineOutcome) -> Self {
        let worst = max_severity(&outcome.findings);
        let anomaly_type = outcome
            .raw
            .get("anomaly_type")
            .and_then(Value::as_str)
            .filter(|label| !label.is_empty())
            .map(ToString::to_string);
        Self {
            claim_id: outcome.claim_id().to_string(),
            stage: outcome.stage,
            max_severity: worst,
            is_flagged: worst.is_flagging(),
            claim_amount: outcome
                .record
                .as_ref()
                .map_or(0.0, |record| record.claim_amount),
            anomaly_type,
            findings: outcome.findings,
        }
    }

    /// Synthetic flagged result for a record whose evaluation failed
    /// entirely; a single failure never aborts sibling records.
    fn failed(raw: &Value) -> Self {
        let claim_id = raw
            .get("claim_id")
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN")
            .to_string();
        Self {
            claim_id,
            stage: Stage::Escalated,
            findings: vec![Finding::new(
                "BATCH-ERR",
                "Batch Validation Error",
                Severity::Critical,
                "Record evaluation failed; flagged for manual review.",
            )],
            max_severity: Severity::Critical,
            is_flagged: true,
            claim_amount: 0.0,
            anomaly_type: None,
        }
    }
}

/// Runs the pipeline over every raw record, in parallel, preserving input
/// order in the output.
pub fn validate_records(pipeline: &ValidationPipeline, raws: &[Value]) -> Vec<RecordResult> {
    if raws.is_empty() {
        return Vec::new();
    }

    let workers = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    let chunk_size = raws.len().div_ceil(workers).max(1);

    let mut results = Vec::with_capacity(raws.len());
    thread::scope(|scope| {
        let handles: Vec<_> = raws
            .chunks(chunk_size)
            .map(|chunk| scope.spawn(move || chunk.iter().map(|raw| run_one(pipeline, raw)).collect::<Vec<_>>()))
            .collect();
        for handle in handles {
            match handle.join() {
                Ok(chunk_results) => results.extend(chunk_results),
                // A worker can only die if run_one itself aborted; the
                // records it held are unrecoverable here, so surface the
                // loss loudly rather than silently shrinking the batch.
                Err(_) => tracing::error!("batch worker thread panicked"),
            }
        }
    });
    results
}

fn run_one(pipeline: &ValidationPipeline, raw: &Value) -> RecordResult {
    match catch_unwind(AssertUnwindSafe(|| pipeline.run(raw))) {
        Ok(outcome) => RecordResult::from_outcome(outcome),
        Err(_) => {
            tracing::error!("record evaluation panicked; emitting synthetic result");
            RecordResult::failed(raw)
        }
    }
}

/// Validates pre-normalized tabular input with the rule engine directly,
/// returning the original frame with `validation_results`, `max_severity`
/// and `is_flagged` columns appended.
pub fn validate_dataframe(engine: &RuleEngine, df: &DataFrame) -> PolarsResult<DataFrame> {
    let height = df.height();
    let mut results_json = Vec::with_capacity(height);
    let mut worst_labels = Vec::with_capacity(height);
    let mut flagged = Vec::with_capacity(height);

    for idx in 0..height {
        let raw = raw_record_from_row(df, idx);
        let (serialized, worst) = match normalize(&raw) {
            Ok(record) => {
                let findings = engine.validate(&record);
                let worst = max_severity(&findings);
                let serialized = serde_json::to_string(&findings)
                    .unwrap_or_else(|_| "[]".to_string());
                (serialized, worst)
            }
            Err(error) => {
                let finding = Finding::new(
                    "PARSE-ERR",
                    "Claim Parsing Error",
                    Severity::Critical,
                    format!("Parsing failed: {error}"),
                );
                let serialized = serde_json::to_string(&[finding])
                    .unwrap_or_else(|_| "[]".to_string());
                (serialized, Severity::Critical)
            }
        };
        results_json.push(serialized);
        worst_labels.push(worst.as_str());
        flagged.push(worst.is_flagging());
    }

    df.hstack(&[
        Series::new("validation_results".into(), results_json).into(),
        Series::new("max_severity".into(), worst_labels).into(),
        Series::new("is_flagged".into(), flagged).into(),
    ])
}

/// Aggregate statistics over one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total_claims: usize,
    pub flagged_claims: usize,
    /// Percentage of unflagged claims, one decimal.
    pub pass_rate: f64,
    pub severity_distribution: BTreeMap<String, usize>,
    /// Histogram of anomaly labels; empty when input carries no labels.
    pub anomaly_distribution: BTreeMap<String, usize>,
    /// Sum of claim amounts over flagged records, two decimals.
    pub total_amount_at_risk: f64,
}

pub fn summarize(results: &[RecordResult]) -> BatchSummary {
    let total = results.len();
    let flagged = results.iter().filter(|result| result.is_flagged).count();

    let mut severity_distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut anomaly_distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut amount_at_risk = 0.0;
    for result in results {
        *severity_distribution
            .entry(result.max_severity.as_str().to_string())
            .or_default() += 1;
        if let Some(label) = &result.anomaly_type {
            *anomaly_distribution.entry(label.clone()).or_default() += 1;
        }
        if result.is_flagged {
            amount_at_risk += result.claim_amount;
        }
    }

    let pass_rate = if total > 0 {
        let rate = (total - flagged) as f64 / total as f64 * 100.0;
        (rate * 10.0).round() / 10.0
    } else {
        0.0
    };

    BatchSummary {
        total_claims: total,
        flagged_claims: flagged,
        pass_rate,
        severity_distribution,
        anomaly_distribution,
        total_amount_at_risk: (amount_at_risk * 100.0).round() / 100.0,
    }
}
