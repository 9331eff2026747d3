//! Rule engine: evaluates the catalog's compliance checks plus registered
//! custom rules against normalized claim records.
//!
//! Evaluation is deterministic and side-effect-free: re-running the same
//! record against the same catalog yields identical findings in the same
//! order. Checks run unconditionally and independently; one record can
//! trigger several of them.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use serde_json::json;

use rxhcc_model::{ClaimRecord, Finding, Severity};
use rxhcc_standards::{ConflictRule, RuleCatalog, icd_category_prefix};

/// A registered custom check: returns a finding when it fires, `None`
/// otherwise.
pub type CustomRule = Box<dyn Fn(&ClaimRecord) -> Option<Finding> + Send + Sync>;

/// Central rule engine. Catalog tables are frozen at construction; custom
/// rules are append-only and should be registered before the first
/// validation call.
pub struct RuleEngine {
    catalog: RuleCatalog,
    custom_rules: Vec<CustomRule>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    /// Engine over the built-in catalog.
    pub fn new() -> Self {
        Self::with_catalog(RuleCatalog::builtin())
    }

    /// Engine over an injected catalog; used for test isolation and rule
    /// updates without touching engine logic.
    pub fn with_catalog(catalog: RuleCatalog) -> Self {
        tracing::debug!(
            mappings = catalog.mapping_count(),
            conflicts = catalog.conflicts().len(),
            "rule engine initialized"
        );
        Self {
            catalog,
            custom_rules: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Registers a custom rule, invoked after the built-in checks in
    /// registration order.
    pub fn register_custom_rule(&mut self, rule: CustomRule) {
        self.custom_rules.push(rule);
    }

    /// Runs every check against one record.
    ///
    /// Never returns an empty list: when no rule fires, a single synthetic
    /// PASS finding is appended.
    pub fn validate(&self, record: &ClaimRecord) -> Vec<Finding> {
        let mut findings = Vec::new();

        findings.extend(self.check_icd_ndc_mapping(record));
        findings.extend(self.check_icd_conflicts(record));
        findings.extend(self.check_glp1(record));
        findings.extend(self.check_hcc_upcoding(record));
        findings.extend(self.run_custom_rules(record));

        if findings.is_empty() {
            findings.push(
                Finding::new(
                    "PASS-000",
                    "All Checks Passed",
                    Severity::Pass,
                    format!("Claim {}: all checks passed.", record.claim_id),
                )
                .with_detail("claim_id", json!(record.claim_id)),
            );
        }

        findings
    }

    /// Validates each record independently, keyed by claim id.
    pub fn validate_batch(&self, records: &[ClaimRecord]) -> BTreeMap<String, Vec<Finding>> {
        records
            .iter()
            .map(|record| (record.claim_id.clone(), self.validate(record)))
            .collect()
    }

    /// Every NDC on the record must match an allowed prefix for each ICD
    /// category the catalog covers. ICDs without a catalog entry are
    /// skipped; coverage is partial by design.
    fn check_icd_ndc_mapping(&self, record: &ClaimRecord) -> Vec<Finding> {
        let mut findings = Vec::new();
        for icd in &record.icd_codes {
            let prefix = icd_category_prefix(icd);
            let Some(mapping) = self.catalog.mapping_for(&prefix) else {
                continue;
            };
            for ndc in &record.ndc_codes {
                let ndc = ndc.trim();
                let allowed = mapping
                    .valid_ndc_prefixes
                    .iter()
                    .any(|valid| ndc.starts_with(valid.as_str()));
                if !allowed {
                    findings.push(
                        Finding::new(
                            "NDC-MISMATCH-001",
                            "ICD-NDC Mapping Mismatch",
                            Severity::Warning,
                            format!(
                                "Drug {ndc} is not on the allowed list for diagnosis {icd} ({})",
                                mapping.description
                            ),
                        )
                        .with_detail("icd_code", json!(icd))
                        .with_detail("ndc_code", json!(ndc))
                        .with_detail("expected_ndc_prefixes", json!(mapping.valid_ndc_prefixes))
                        .with_detail("diagnosis_description", json!(mapping.description)),
                    );
                }
            }
        }
        findings
    }

    /// One finding per conflict rule whose two prefix sets are both
    /// matched. A code satisfying both sides counts for both; the
    /// membership tests are deliberately independent.
    fn check_icd_conflicts(&self, record: &ClaimRecord) -> Vec<Finding> {
        let mut findings = Vec::new();
        for rule in self.catalog.conflicts() {
            let has_a = matches_any_prefix(&record.icd_codes, &rule.codes_a);
            let has_b = matches_any_prefix(&record.icd_codes, &rule.codes_b);
            if has_a && has_b {
                findings.push(conflict_finding(rule, record));
            }
        }
        findings
    }

    /// GLP-1 checks gate on the drug class being present. Off-label use
    /// and type-1 contraindication are evaluated independently and can
    /// both fire on the same record; given the medical seriousness, that
    /// duplication is intentional.
    fn check_glp1(&self, record: &ClaimRecord) -> Vec<Finding> {
        let glp1 = self.catalog.glp1();
        let has_glp1 = record.ndc_codes.iter().any(|ndc| {
            glp1.ndc_prefixes
                .iter()
                .any(|prefix| ndc.trim().starts_with(prefix.as_str()))
        });
        if !has_glp1 {
            return Vec::new();
        }

        let mut findings = Vec::new();
        let has_indication = matches_any_prefix(&record.icd_codes, &glp1.approved_icd_prefixes);
        if !has_indication {
            findings.push(
                Finding::new(
                    "GLP1-001",
                    "GLP-1 Off-Label Use Detection",
                    Severity::Critical,
                    "GLP-1 product dispensed without an approved indication \
                     (E11 type 2 diabetes or E66 obesity); possible off-label use.",
                )
                .with_detail("ndc_codes", json!(record.ndc_codes))
                .with_detail("icd_codes", json!(record.icd_codes))
                .with_detail("required_icd_prefixes", json!(glp1.approved_icd_prefixes)),
            );
        }

        let has_type1 = record
            .icd_codes
            .iter()
            .any(|icd| icd.trim().starts_with(glp1.type1_icd_prefix.as_str()));
        if has_type1 {
            findings.push(
                Finding::new(
                    "GLP1-002",
                    "GLP-1 for Type 1 Diabetes",
                    Severity::Critical,
                    "GLP-1 product dispensed to a type 1 diabetes (E10) patient; \
                     GLP-1 is not indicated for type 1 diabetes.",
                )
                .with_detail("ndc_codes", json!(record.ndc_codes))
                .with_detail("icd_codes", json!(record.icd_codes)),
            );
        }

        findings
    }

    /// Each HCC present in the upcoding map needs at least one expected
    /// ICD on the record; the reported risk-score impact is descriptive
    /// only and never feeds the engine's own scoring.
    fn check_hcc_upcoding(&self, record: &ClaimRecord) -> Vec<Finding> {
        let mut findings = Vec::new();
        for hcc in &record.hcc_codes {
            let hcc_upper = hcc.trim().to_uppercase();
            let Some(rule) = self.catalog.upcoding_for(&hcc_upper) else {
                continue;
            };
            let supported = record
                .icd_codes
                .iter()
                .any(|icd| rule.expected_icds.iter().any(|expected| expected == icd));
            if !supported {
                findings.push(
                    Finding::new(
                        "HCC-UPCODE-001",
                        "Potential HCC Upcoding",
                        Severity::Critical,
                        format!(
                            "HCC {hcc_upper} ({}) assigned without a supporting ICD code. \
                             Risk score impact: {}",
                            rule.description, rule.risk_score_impact
                        ),
                    )
                    .with_detail("hcc_code", json!(hcc_upper))
                    .with_detail("expected_icds", json!(rule.expected_icds))
                    .with_detail("actual_icds", json!(record.icd_codes))
                    .with_detail("risk_score_impact", json!(rule.risk_score_impact)),
                );
            }
        }
        findings
    }

    /// Custom rules run after the built-in checks in registration order.
    /// A panicking rule is caught and logged; it never affects sibling
    /// rules or the overall result.
    fn run_custom_rules(&self, record: &ClaimRecord) -> Vec<Finding> {
        let mut findings = Vec::new();
        for (index, rule) in self.custom_rules.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| rule(record))) {
                Ok(Some(finding)) => findings.push(finding),
                Ok(None) => {}
                Err(panic) => {
                    let message = panic
                        .downcast_ref::<&str>()
                        .map(|s| (*s).to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    tracing::error!(
                        rule_index = index,
                        claim_id = %record.claim_id,
                        panic = %message,
                        "custom rule panicked; skipping"
                    );
                }
            }
        }
        findings
    }
}

fn matches_any_prefix(codes: &[String], prefixes: &[String]) -> bool {
    codes.iter().any(|code| {
        prefixes
            .iter()
            .any(|prefix| code.trim().starts_with(prefix.as_str()))
    })
}

fn conflict_finding(rule: &ConflictRule, record: &ClaimRecord) -> Finding {
    Finding::new(
        rule.rule_id.clone(),
        rule.name.clone(),
        rule.severity,
        rule.message.clone(),
    )
    .with_detail("icd_codes", json!(record.icd_codes))
    .with_detail(
        "conflicting_groups",
        json!([rule.codes_a, rule.codes_b]),
    )
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("catalog", &self.catalog)
            .field("custom_rules", &self.custom_rules.len())
            .finish()
    }
}
