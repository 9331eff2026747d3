//! Escalation pipeline state machine tests.

use serde_json::{Value, json};

use rxhcc_model::{RiskLevel, Severity};
use rxhcc_validate::{Stage, ValidationPipeline};

#[test]
fn clean_claim_is_approved() {
    let pipeline = ValidationPipeline::new();
    let outcome = pipeline.run(&json!({
        "claim_id": "WF-001",
        "patient_id": "PAT-001",
        "icd_codes": "E11.9",
        "ndc_codes": "00002-1433-80",
        "hcc_codes": ""
    }));

    assert_eq!(outcome.stage, Stage::Approved);
    assert!(!outcome.should_escalate);
    assert!(outcome.findings.iter().any(|f| f.rule_id == "PARSE-OK"));
    assert!(outcome.findings.iter().any(|f| f.rule_id == "RISK-SCORE"));
    assert!(
        outcome
            .findings
            .iter()
            .any(|f| f.rule_id == "AUTO-APPROVE" && f.severity == Severity::Pass)
    );
}

#[test]
fn conflicting_claim_escalates_end_to_end() {
    // The WF-002 scenario: a type 1/type 2 conflict runs the full stage
    // sequence and terminates escalated.
    let pipeline = ValidationPipeline::new();
    let outcome = pipeline.run(&json!({
        "claim_id": "WF-002",
        "patient_id": "PAT-002",
        "icd_codes": "E10.9,E11.65",
        "ndc_codes": "00088-2500-33",
        "hcc_codes": ""
    }));

    assert_eq!(outcome.stage, Stage::Escalated);
    assert!(outcome.should_escalate);
    assert!(outcome.escalation_reason.contains("CRITICAL"));
    let conflict = outcome
        .findings
        .iter()
        .find(|f| f.rule_id == "CONFLICT-001")
        .expect("conflict finding");
    assert_eq!(conflict.severity, Severity::Critical);
    assert!(outcome.findings.iter().any(|f| f.rule_id == "ESCALATE"));
    assert!(!outcome.findings.iter().any(|f| f.rule_id == "AUTO-APPROVE"));
}

#[test]
fn parse_error_skips_rules_and_scoring() {
    let pipeline = ValidationPipeline::new();
    let outcome = pipeline.run(&Value::Null);

    assert_eq!(outcome.stage, Stage::Escalated);
    assert!(outcome.should_escalate);
    assert!(outcome.escalation_reason.starts_with("Parse error:"));
    assert!(outcome.record.is_none());
    // Scoring never ran.
    assert!(outcome.metadata.is_none());
    assert!(!outcome.findings.iter().any(|f| f.rule_id == "RISK-SCORE"));
    assert!(
        outcome
            .findings
            .iter()
            .any(|f| f.rule_id == "PARSE-ERR" && f.severity == Severity::Critical)
    );
}

#[test]
fn scoring_runs_even_when_escalating() {
    let pipeline = ValidationPipeline::new();
    let outcome = pipeline.run(&json!({
        "claim_id": "WF-003",
        "icd_codes": "I10",
        "ndc_codes": "00169-4060-12",
    }));

    // GLP-1 off-label: escalated, but scoring completed first.
    assert_eq!(outcome.stage, Stage::Escalated);
    let metadata = outcome.metadata.expect("metadata populated");
    assert!(metadata.risk_score >= 10);
    assert!(matches!(
        metadata.risk_level,
        RiskLevel::Medium | RiskLevel::High
    ));
    assert!(outcome.findings.iter().any(|f| f.rule_id == "RISK-SCORE"));
}

#[test]
fn escalation_flag_is_monotone() {
    // Once any stage sets the flag, the terminal stage is Escalated.
    let pipeline = ValidationPipeline::new();
    let escalating_inputs = [
        json!({"claim_id": "M-1", "icd_codes": "E10.9,E11.65", "ndc_codes": ""}),
        json!({"claim_id": "M-2", "icd_codes": "I10", "ndc_codes": "00169-4060-12"}),
        json!({"claim_id": "M-3", "icd_codes": "E11.9", "hcc_codes": "HCC85"}),
        Value::Array(vec![]),
    ];
    for raw in escalating_inputs {
        let outcome = pipeline.run(&raw);
        assert!(outcome.should_escalate, "input should escalate: {raw}");
        assert_eq!(outcome.stage, Stage::Escalated);
    }
}

#[test]
fn risk_summary_reflects_pre_summary_score() {
    let pipeline = ValidationPipeline::new();
    // One INFO (parse) + one WARNING (mismatch) = 6 → LOW.
    let outcome = pipeline.run(&json!({
        "claim_id": "WF-004",
        "icd_codes": "I10",
        "ndc_codes": "00088-2500-33",
    }));

    let metadata = outcome.metadata.expect("metadata");
    assert_eq!(metadata.risk_score, 6);
    assert_eq!(metadata.risk_level, RiskLevel::Low);
    // WARNING alone does not escalate.
    assert_eq!(outcome.stage, Stage::Approved);
}

#[test]
fn terminal_stages_are_flagged_terminal() {
    assert!(Stage::Escalated.is_terminal());
    assert!(Stage::Approved.is_terminal());
    assert!(!Stage::ScoringComplete.is_terminal());
    assert!(!Stage::Init.is_terminal());
}
