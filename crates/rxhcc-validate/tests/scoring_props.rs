//! Property tests for risk scoring invariants.

use proptest::prelude::*;

use rxhcc_model::{Finding, RiskLevel, Severity};
use rxhcc_validate::score_findings;

fn severity_strategy() -> impl Strategy<Value = Severity> {
    prop::sample::select(vec![
        Severity::Pass,
        Severity::Info,
        Severity::Warning,
        Severity::Critical,
    ])
}

fn findings_strategy() -> impl Strategy<Value = Vec<Finding>> {
    prop::collection::vec(severity_strategy(), 0..16).prop_map(|severities| {
        severities
            .into_iter()
            .map(|severity| Finding::new("T-000", "test", severity, "test finding"))
            .collect()
    })
}

fn level_rank(level: RiskLevel) -> u8 {
    match level {
        RiskLevel::Minimal => 0,
        RiskLevel::Low => 1,
        RiskLevel::Medium => 2,
        RiskLevel::High => 3,
    }
}

proptest! {
    /// Appending a finding never decreases the score; the increase is
    /// exactly the appended severity's weight.
    #[test]
    fn appending_a_finding_never_decreases_the_score(
        mut findings in findings_strategy(),
        extra in severity_strategy(),
    ) {
        let (before, _) = score_findings(&findings);
        findings.push(Finding::new("T-EXT", "test", extra, "appended"));
        let (after, _) = score_findings(&findings);
        prop_assert!(after >= before);
        prop_assert_eq!(after, before + extra.weight());
    }

    /// The risk level is monotone in the score: a higher score never maps
    /// to a lower level.
    #[test]
    fn risk_level_is_monotone_in_score(a in 0u32..200, b in 0u32..200) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            level_rank(RiskLevel::from_score(lo)) <= level_rank(RiskLevel::from_score(hi))
        );
    }

    /// The score depends only on severities, never on rule ids or
    /// messages.
    #[test]
    fn score_ignores_finding_text(findings in findings_strategy()) {
        let relabeled: Vec<Finding> = findings
            .iter()
            .map(|f| Finding::new("OTHER-999", "other", f.severity, "different text"))
            .collect();
        prop_assert_eq!(score_findings(&findings), score_findings(&relabeled));
    }
}
