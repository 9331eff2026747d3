use std::collections::BTreeMap;

use rxhcc_model::Severity;

use crate::defaults;

/// Allowed drug prefixes for one ICD diagnosis category.
#[derive(Debug, Clone)]
pub struct IcdNdcMapping {
    /// ICD category prefix this entry covers (e.g. `E11`).
    pub icd_prefix: String,
    /// NDC prefixes considered appropriate for the diagnosis.
    pub valid_ndc_prefixes: Vec<String>,
    pub description: String,
}

/// Two sets of ICD prefixes that must not co-occur on one claim.
#[derive(Debug, Clone)]
pub struct ConflictRule {
    pub rule_id: String,
    pub name: String,
    pub codes_a: Vec<String>,
    pub codes_b: Vec<String>,
    pub severity: Severity,
    pub message: String,
}

/// Indication rules for the GLP-1 drug class.
#[derive(Debug, Clone)]
pub struct Glp1Rules {
    /// NDC prefixes identifying GLP-1 products.
    pub ndc_prefixes: Vec<String>,
    /// ICD prefixes of approved indications (type-2 diabetes, obesity).
    pub approved_icd_prefixes: Vec<String>,
    /// ICD prefix for type-1 diabetes, a contraindication.
    pub type1_icd_prefix: String,
}

/// Diagnosis evidence expected for one high-risk HCC assignment.
#[derive(Debug, Clone)]
pub struct HccUpcodingRule {
    pub hcc_code: String,
    /// ICD codes considered sufficient justification; exact matches.
    pub expected_icds: Vec<String>,
    pub description: String,
    /// Descriptive risk-adjustment impact; reported, never scored.
    pub risk_score_impact: f64,
}

/// The full rule table set an engine evaluates.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    mappings: BTreeMap<String, IcdNdcMapping>,
    conflicts: Vec<ConflictRule>,
    glp1: Glp1Rules,
    upcoding: BTreeMap<String, HccUpcodingRule>,
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RuleCatalog {
    /// The built-in illustrative catalog.
    pub fn builtin() -> Self {
        Self {
            mappings: index_mappings(defaults::icd_ndc_mappings()),
            conflicts: defaults::conflict_rules(),
            glp1: defaults::glp1_rules(),
            upcoding: index_upcoding(defaults::hcc_upcoding_rules()),
        }
    }

    /// An empty catalog; useful as a base for fully injected tables.
    pub fn empty() -> Self {
        Self {
            mappings: BTreeMap::new(),
            conflicts: Vec::new(),
            glp1: Glp1Rules {
                ndc_prefixes: Vec::new(),
                approved_icd_prefixes: Vec::new(),
                type1_icd_prefix: String::new(),
            },
            upcoding: BTreeMap::new(),
        }
    }

    pub fn with_mappings(mut self, mappings: Vec<IcdNdcMapping>) -> Self {
        self.mappings = index_mappings(mappings);
        self
    }

    pub fn with_conflicts(mut self, conflicts: Vec<ConflictRule>) -> Self {
        self.conflicts = conflicts;
        self
    }

    pub fn with_glp1(mut self, glp1: Glp1Rules) -> Self {
        self.glp1 = glp1;
        self
    }

    pub fn with_upcoding(mut self, rules: Vec<HccUpcodingRule>) -> Self {
        self.upcoding = index_upcoding(rules);
        self
    }

    /// Mapping entry for an ICD category prefix, if covered.
    pub fn mapping_for(&self, icd_prefix: &str) -> Option<&IcdNdcMapping> {
        self.mappings.get(&icd_prefix.trim().to_uppercase())
    }

    pub fn mappings(&self) -> impl Iterator<Item = &IcdNdcMapping> {
        self.mappings.values()
    }

    pub fn mapping_count(&self) -> usize {
        self.mappings.len()
    }

    pub fn conflicts(&self) -> &[ConflictRule] {
        &self.conflicts
    }

    pub fn glp1(&self) -> &Glp1Rules {
        &self.glp1
    }

    /// Upcoding entry for an HCC code; lookup is case-insensitive.
    pub fn upcoding_for(&self, hcc_code: &str) -> Option<&HccUpcodingRule> {
        self.upcoding.get(&hcc_code.trim().to_uppercase())
    }

    pub fn upcoding_rules(&self) -> impl Iterator<Item = &HccUpcodingRule> {
        self.upcoding.values()
    }
}

fn index_mappings(mappings: Vec<IcdNdcMapping>) -> BTreeMap<String, IcdNdcMapping> {
    mappings
        .into_iter()
        .map(|mapping| (mapping.icd_prefix.to_uppercase(), mapping))
        .collect()
}

fn index_upcoding(rules: Vec<HccUpcodingRule>) -> BTreeMap<String, HccUpcodingRule> {
    rules
        .into_iter()
        .map(|rule| (rule.hcc_code.to_uppercase(), rule))
        .collect()
}
