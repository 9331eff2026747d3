//! Rule engine behavior tests.

use rxhcc_model::{ClaimRecord, Finding, Severity};
use rxhcc_standards::{ConflictRule, RuleCatalog};
use rxhcc_validate::RuleEngine;

fn claim(icd_codes: &[&str], ndc_codes: &[&str]) -> ClaimRecord {
    ClaimRecord {
        claim_id: "TEST-001".to_string(),
        patient_id: "PAT-001".to_string(),
        icd_codes: icd_codes.iter().map(|c| (*c).to_string()).collect(),
        ndc_codes: ndc_codes.iter().map(|c| (*c).to_string()).collect(),
        ..ClaimRecord::default()
    }
}

fn claim_with_hcc(icd_codes: &[&str], ndc_codes: &[&str], hcc_codes: &[&str]) -> ClaimRecord {
    let mut record = claim(icd_codes, ndc_codes);
    record.hcc_codes = hcc_codes.iter().map(|c| (*c).to_string()).collect();
    record
}

fn criticals(findings: &[Finding]) -> Vec<&Finding> {
    findings
        .iter()
        .filter(|finding| finding.severity == Severity::Critical)
        .collect()
}

#[test]
fn normal_t2_diabetes_with_metformin_has_no_criticals() {
    let engine = RuleEngine::new();
    let findings = engine.validate(&claim(&["E11.9"], &["00002-1433-80"]));
    assert!(criticals(&findings).is_empty());
}

#[test]
fn t1_t2_conflict_fires_critical() {
    let engine = RuleEngine::new();
    let findings = engine.validate(&claim(&["E10.9", "E11.65"], &["00088-2500-33"]));
    let criticals = criticals(&findings);
    assert!(!criticals.is_empty());
    assert!(
        criticals
            .iter()
            .any(|finding| finding.rule_id.contains("CONFLICT"))
    );
}

#[test]
fn conflict_fires_regardless_of_extra_codes() {
    // Conflict symmetry: any E10* + E11* pair yields CONFLICT-001.
    let engine = RuleEngine::new();
    for extra in [vec![], vec!["I10"], vec!["Z86.39", "J45.20"]] {
        let mut icds = vec!["E10.10", "E11.21"];
        icds.extend(extra);
        let findings = engine.validate(&claim(&icds, &[]));
        let conflict = findings
            .iter()
            .find(|finding| finding.rule_id == "CONFLICT-001")
            .expect("CONFLICT-001 present");
        assert_eq!(conflict.severity, Severity::Critical);
    }
}

#[test]
fn glp1_without_indication_is_critical() {
    let engine = RuleEngine::new();
    let findings = engine.validate(&claim(&["I10"], &["00169-4060-12"]));
    let criticals = criticals(&findings);
    assert!(
        criticals
            .iter()
            .any(|finding| finding.rule_id.contains("GLP1"))
    );
}

#[test]
fn glp1_with_t2_diabetes_is_clean() {
    let engine = RuleEngine::new();
    let findings = engine.validate(&claim(&["E11.9"], &["00169-4060-12"]));
    assert!(
        !findings
            .iter()
            .any(|f| f.severity == Severity::Critical && f.rule_id.contains("GLP1"))
    );
}

#[test]
fn glp1_with_obesity_is_clean() {
    let engine = RuleEngine::new();
    let findings = engine.validate(&claim(&["E66.01"], &["00169-4060-13"]));
    assert!(
        !findings
            .iter()
            .any(|f| f.severity == Severity::Critical && f.rule_id.contains("GLP1"))
    );
}

#[test]
fn glp1_for_type1_fires_both_criticals() {
    // A type-1 patient with no qualifying diagnosis triggers both the
    // off-label and the contraindication findings.
    let engine = RuleEngine::new();
    let findings = engine.validate(&claim(&["E10.9"], &["00169-4060-12"]));
    let glp1: Vec<_> = findings
        .iter()
        .filter(|f| f.severity == Severity::Critical && f.rule_id.contains("GLP1"))
        .collect();
    assert_eq!(glp1.len(), 2);
}

#[test]
fn hcc_upcoding_without_support_fires() {
    let engine = RuleEngine::new();
    let findings = engine.validate(&claim_with_hcc(
        &["E11.9"],
        &["00002-1433-80"],
        &["HCC18"],
    ));
    assert!(findings.iter().any(|f| f.rule_id.contains("UPCODE")));
}

#[test]
fn hcc_with_supporting_icd_is_clean() {
    let engine = RuleEngine::new();
    let findings = engine.validate(&claim_with_hcc(
        &["E11.65"],
        &["00002-1433-80"],
        &["HCC18"],
    ));
    assert!(!findings.iter().any(|f| f.rule_id.contains("UPCODE")));
}

#[test]
fn ndc_mismatch_names_the_pair() {
    let engine = RuleEngine::new();
    let findings = engine.validate(&claim(&["I10"], &["00088-2500-33"]));
    let mismatch = findings
        .iter()
        .find(|f| f.rule_id == "NDC-MISMATCH-001")
        .expect("mismatch finding");
    assert_eq!(mismatch.severity, Severity::Warning);
    assert_eq!(mismatch.details["icd_code"], "I10");
    assert_eq!(mismatch.details["ndc_code"], "00088-2500-33");
}

#[test]
fn unmapped_icd_is_skipped() {
    let engine = RuleEngine::new();
    // A00 has no catalog entry; any NDC is acceptable.
    let findings = engine.validate(&claim(&["A00.1"], &["99999-9999-99"]));
    assert!(!findings.iter().any(|f| f.rule_id == "NDC-MISMATCH-001"));
}

#[test]
fn zero_matches_yields_single_pass_finding() {
    let engine = RuleEngine::new();
    let findings = engine.validate(&claim(&[], &[]));
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule_id, "PASS-000");
    assert_eq!(findings[0].severity, Severity::Pass);
}

#[test]
fn validation_is_idempotent() {
    let engine = RuleEngine::new();
    let record = claim_with_hcc(&["E10.9", "E11.65"], &["00169-4060-12"], &["HCC18"]);
    let first = engine.validate(&record);
    let second = engine.validate(&record);
    assert_eq!(first, second);
}

#[test]
fn custom_rule_fires_in_order() {
    let mut engine = RuleEngine::new();
    engine.register_custom_rule(Box::new(|record: &ClaimRecord| {
        (record.claim_amount > 10_000.0).then(|| {
            Finding::new(
                "CUSTOM-001",
                "High Amount Check",
                Severity::Warning,
                format!("Claim amount ${} exceeds $10,000", record.claim_amount),
            )
        })
    }));

    let mut record = claim(&["E11.9"], &["00002-1433-80"]);
    record.claim_amount = 25_000.0;
    let findings = engine.validate(&record);
    let custom: Vec<_> = findings
        .iter()
        .filter(|f| f.rule_id == "CUSTOM-001")
        .collect();
    assert_eq!(custom.len(), 1);
}

#[test]
fn panicking_custom_rule_is_isolated() {
    let mut engine = RuleEngine::new();
    engine.register_custom_rule(Box::new(|_: &ClaimRecord| -> Option<Finding> {
        panic!("custom rule blew up")
    }));
    engine.register_custom_rule(Box::new(|_: &ClaimRecord| {
        Some(Finding::new(
            "CUSTOM-002",
            "Sibling Rule",
            Severity::Info,
            "still runs",
        ))
    }));

    let findings = engine.validate(&claim(&["E10.9", "E11.65"], &[]));
    // Built-in findings survive and the sibling custom rule still runs.
    assert!(findings.iter().any(|f| f.rule_id == "CONFLICT-001"));
    assert!(findings.iter().any(|f| f.rule_id == "CUSTOM-002"));
}

#[test]
fn injected_catalog_replaces_builtin_rules() {
    let catalog = RuleCatalog::builtin().with_conflicts(vec![ConflictRule {
        rule_id: "CONFLICT-X".to_string(),
        name: "Test Conflict".to_string(),
        codes_a: vec!["A00".to_string()],
        codes_b: vec!["B00".to_string()],
        severity: Severity::Warning,
        message: "test conflict".to_string(),
    }]);
    let engine = RuleEngine::with_catalog(catalog);

    // The built-in E10/E11 conflict no longer exists.
    let findings = engine.validate(&claim(&["E10.9", "E11.65"], &[]));
    assert!(!findings.iter().any(|f| f.rule_id == "CONFLICT-001"));

    let findings = engine.validate(&claim(&["A00.1", "B00.2"], &[]));
    assert!(findings.iter().any(|f| f.rule_id == "CONFLICT-X"));
}

#[test]
fn validate_batch_keys_by_claim_id() {
    let engine = RuleEngine::new();
    let mut a = claim(&["E11.9"], &["00002-1433-80"]);
    a.claim_id = "CLM-A".to_string();
    let mut b = claim(&["E10.9", "E11.65"], &[]);
    b.claim_id = "CLM-B".to_string();

    let results = engine.validate_batch(&[a, b]);
    assert_eq!(results.len(), 2);
    assert!(results["CLM-A"].iter().all(|f| f.severity < Severity::Critical));
    assert!(
        results["CLM-B"]
            .iter()
            .any(|f| f.rule_id == "CONFLICT-001")
    );
}
