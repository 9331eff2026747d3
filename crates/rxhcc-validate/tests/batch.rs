//! Batch validation and summary statistics tests.

use polars::prelude::{DataFrame, NamedFrom, Series};
use serde_json::{Value, json};

use rxhcc_validate::{
    RuleEngine, SynthOptions, SyntheticClaimGenerator, ValidationPipeline, summarize,
    validate_dataframe, validate_records,
};

#[test]
fn batch_preserves_input_order_and_flags() {
    let pipeline = ValidationPipeline::new();
    let raws = vec![
        json!({"claim_id": "B-1", "icd_codes": "E11.9", "ndc_codes": "00002-1433-80"}),
        json!({"claim_id": "B-2", "icd_codes": "E10.9,E11.65", "ndc_codes": "00088-2500-33"}),
        json!({"claim_id": "B-3", "icd_codes": "I10", "ndc_codes": "00071-0155-23"}),
    ];

    let results = validate_records(&pipeline, &raws);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].claim_id, "B-1");
    assert_eq!(results[1].claim_id, "B-2");
    assert_eq!(results[2].claim_id, "B-3");
    assert!(!results[0].is_flagged);
    assert!(results[1].is_flagged);
    assert!(!results[2].is_flagged);
}

#[test]
fn malformed_record_degrades_without_aborting_batch() {
    let pipeline = ValidationPipeline::new();
    let raws = vec![
        json!({"claim_id": "OK-1", "icd_codes": "E11.9", "ndc_codes": "00002-1433-80"}),
        Value::Null,
        json!({"claim_id": "OK-2", "icd_codes": "I10", "ndc_codes": "00071-0155-23"}),
    ];

    let results = validate_records(&pipeline, &raws);
    assert_eq!(results.len(), 3);
    assert!(results[1].is_flagged);
    assert_eq!(results[1].claim_id, "UNKNOWN");
    assert!(!results[0].is_flagged);
    assert!(!results[2].is_flagged);
}

#[test]
fn summary_accounts_flags_amounts_and_labels() {
    let pipeline = ValidationPipeline::new();
    let raws = vec![
        json!({
            "claim_id": "S-1", "icd_codes": "E11.9", "ndc_codes": "00002-1433-80",
            "claim_amount": 100.0, "anomaly_type": "NORMAL"
        }),
        json!({
            "claim_id": "S-2", "icd_codes": "E10.9,E11.65", "ndc_codes": "00088-2500-33",
            "claim_amount": 250.5, "anomaly_type": "ICD_CONFLICT"
        }),
        json!({
            "claim_id": "S-3", "icd_codes": "I10", "ndc_codes": "00169-4060-12",
            "claim_amount": 99.5, "anomaly_type": "GLP1_MISUSE"
        }),
        json!({
            "claim_id": "S-4", "icd_codes": "I10", "ndc_codes": "00071-0155-23",
            "claim_amount": 75.0, "anomaly_type": "NORMAL"
        }),
    ];

    let results = validate_records(&pipeline, &raws);
    let summary = summarize(&results);

    assert_eq!(summary.total_claims, 4);
    assert_eq!(summary.flagged_claims, 2);
    assert_eq!(summary.pass_rate, 50.0);
    assert_eq!(summary.total_amount_at_risk, 350.0);
    assert_eq!(summary.severity_distribution["CRITICAL"], 2);
    assert_eq!(summary.anomaly_distribution["NORMAL"], 2);
    assert_eq!(summary.anomaly_distribution["ICD_CONFLICT"], 1);
    assert_eq!(summary.anomaly_distribution["GLP1_MISUSE"], 1);
}

#[test]
fn empty_batch_summary() {
    let summary = summarize(&[]);
    assert_eq!(summary.total_claims, 0);
    assert_eq!(summary.flagged_claims, 0);
    assert_eq!(summary.pass_rate, 0.0);
    assert_eq!(summary.total_amount_at_risk, 0.0);
}

#[test]
fn dataframe_validation_appends_result_columns() {
    let engine = RuleEngine::new();
    let df = DataFrame::new(vec![
        Series::new(
            "claim_id".into(),
            vec!["DF-1", "DF-2"],
        )
        .into(),
        Series::new(
            "icd_codes".into(),
            vec!["E11.9", "E10.9,E11.65"],
        )
        .into(),
        Series::new(
            "ndc_codes".into(),
            vec!["00002-1433-80", "00088-2500-33"],
        )
        .into(),
    ])
    .expect("frame");

    let validated = validate_dataframe(&engine, &df).expect("validate frame");
    assert_eq!(validated.height(), 2);
    assert!(validated.column("validation_results").is_ok());

    let severities = validated
        .column("max_severity")
        .expect("column")
        .str()
        .expect("string column");
    assert_eq!(severities.get(0), Some("PASS"));
    assert_eq!(severities.get(1), Some("CRITICAL"));

    let flagged = validated
        .column("is_flagged")
        .expect("column")
        .bool()
        .expect("bool column");
    assert_eq!(flagged.get(0), Some(false));
    assert_eq!(flagged.get(1), Some(true));
}

#[test]
fn synthetic_batch_flags_all_rule_anomalies() {
    let options = SynthOptions {
        records: 200,
        anomaly_rate: 0.3,
        seed: 42,
    };
    let raws = SyntheticClaimGenerator::new(options.seed).generate(&options);
    let pipeline = ValidationPipeline::new();
    let results = validate_records(&pipeline, &raws);
    let summary = summarize(&results);

    assert_eq!(summary.total_claims, 200);
    // Every generated rule-detectable anomaly is flagged.
    for result in &results {
        match result.anomaly_type.as_deref() {
            Some("ICD_CONFLICT") | Some("GLP1_MISUSE") | Some("HCC_UPCODING")
            | Some("NDC_MISMATCH") => {
                assert!(result.is_flagged, "claim {} should be flagged", result.claim_id);
            }
            _ => {}
        }
    }
    assert!(summary.flagged_claims >= summary.anomaly_distribution.get("ICD_CONFLICT").copied().unwrap_or(0));
}
