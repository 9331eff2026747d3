use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome severity for a single rule evaluation.
///
/// Variant order matters: the derived `Ord` gives `Pass < Info < Warning <
/// Critical`, which is what batch aggregation relies on when picking the
/// worst severity per claim.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[default]
    Pass,
    Info,
    Warning,
    Critical,
}

impl Severity {
    /// Numeric weight used by the risk scorer.
    pub fn weight(self) -> u32 {
        match self {
            Severity::Pass => 0,
            Severity::Info => 1,
            Severity::Warning => 5,
            Severity::Critical => 10,
        }
    }

    /// Whether a claim whose worst finding has this severity is flagged
    /// for review.
    pub fn is_flagging(self) -> bool {
        matches!(self, Severity::Warning | Severity::Critical)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Pass => "PASS",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete risk classification derived from the summed severity weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Thresholds are evaluated high to low, first match wins.
    pub fn from_score(score: u32) -> Self {
        if score >= 20 {
            RiskLevel::High
        } else if score >= 10 {
            RiskLevel::Medium
        } else if score >= 5 {
            RiskLevel::Low
        } else {
            RiskLevel::Minimal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Minimal => "MINIMAL",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rule's outcome for one claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Stable identifier, unique per rule invocation site.
    pub rule_id: String,
    pub rule_name: String,
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Supporting evidence, e.g. the offending codes.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl Finding {
    pub fn new(
        rule_id: impl Into<String>,
        rule_name: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            rule_name: rule_name.into(),
            severity,
            message: message.into(),
            details: Map::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}

/// Worst severity across a finding list; `Pass` when the list is empty.
pub fn max_severity(findings: &[Finding]) -> Severity {
    findings
        .iter()
        .map(|finding| finding.severity)
        .max()
        .unwrap_or(Severity::Pass)
}
