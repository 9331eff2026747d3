//! Severity-weighted risk scoring.

use rxhcc_model::{Finding, RiskLevel, Severity};

/// Reduces a finding list to a numeric score and a discrete risk level.
///
/// The score is the sum of severity weights (PASS=0, INFO=1, WARNING=5,
/// CRITICAL=10). Scoring happens exactly once per pipeline run, before the
/// summary finding is appended, so the summary never feeds back into the
/// score.
pub fn score_findings(findings: &[Finding]) -> (u32, RiskLevel) {
    let score = findings
        .iter()
        .map(|finding| finding.severity.weight())
        .sum();
    (score, RiskLevel::from_score(score))
}

/// The INFO finding appended after scoring, summarizing score and level.
pub fn risk_summary_finding(score: u32, level: RiskLevel) -> Finding {
    Finding::new(
        "RISK-SCORE",
        "Risk Assessment",
        Severity::Info,
        format!("Overall risk score: {score} ({level})"),
    )
}
