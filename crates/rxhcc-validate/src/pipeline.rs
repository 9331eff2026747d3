//! Per-record validation pipeline: a fixed finite-state machine.
//!
//! Stage sequence: `Init → Parsed → RulesComplete → ScoringComplete →
//! {Escalated | Approved}`. A normalization failure branches `Init →
//! ParseError` and skips the rule and scoring stages entirely; the record
//! still terminates in `Escalated`.
//!
//! Each run exclusively owns one [`PipelineOutcome`]; the escalation flag
//! is monotone for the duration of a run: once set, no later stage clears
//! it.

use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::Serialize;
use serde_json::Value;

use rxhcc_ingest::normalize;
use rxhcc_model::{ClaimRecord, Finding, RiskLevel, Severity};

use crate::engine::RuleEngine;
use crate::scoring::{risk_summary_finding, score_findings};

/// Pipeline stage tag. `Escalated` and `Approved` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    Parsed,
    ParseError,
    RulesComplete,
    ScoringComplete,
    Escalated,
    Approved,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Escalated | Stage::Approved)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Parsed => "parsed",
            Stage::ParseError => "parse_error",
            Stage::RulesComplete => "rules_complete",
            Stage::ScoringComplete => "scoring_complete",
            Stage::Escalated => "escalated",
            Stage::Approved => "approved",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk metadata produced by the scoring stage.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PipelineMetadata {
    pub risk_score: u32,
    pub risk_level: RiskLevel,
}

/// Working state of one pipeline run, handed to the caller as the final
/// output once a terminal stage is reached.
#[derive(Debug, Serialize)]
pub struct PipelineOutcome {
    /// Original raw input.
    pub raw: Value,
    /// Normalized record, once parsing succeeded.
    pub record: Option<ClaimRecord>,
    /// Accumulated findings across all stages.
    pub findings: Vec<Finding>,
    pub stage: Stage,
    pub should_escalate: bool,
    pub escalation_reason: String,
    pub metadata: Option<PipelineMetadata>,
}

impl PipelineOutcome {
    fn new(raw: Value) -> Self {
        Self {
            raw,
            record: None,
            findings: Vec::new(),
            stage: Stage::Init,
            should_escalate: false,
            escalation_reason: String::new(),
            metadata: None,
        }
    }

    /// Sets the escalation flag. The flag is set-only; the reason records
    /// the most recent trigger.
    fn escalate(&mut self, reason: impl Into<String>) {
        self.should_escalate = true;
        self.escalation_reason = reason.into();
    }

    /// Claim id for reporting; falls back to UNKNOWN before parsing.
    pub fn claim_id(&self) -> &str {
        self.record
            .as_ref()
            .map_or("UNKNOWN", |record| record.claim_id.as_str())
    }
}

/// Sequences normalization, rule evaluation, scoring and the escalation
/// decision for one raw claim at a time.
#[derive(Debug, Default)]
pub struct ValidationPipeline {
    engine: RuleEngine,
}

impl ValidationPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(engine: RuleEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// Mutable engine access for one-time custom-rule registration before
    /// the first run.
    pub fn engine_mut(&mut self) -> &mut RuleEngine {
        &mut self.engine
    }

    /// Runs the full state machine for one raw claim.
    pub fn run(&self, raw: &Value) -> PipelineOutcome {
        let mut state = PipelineOutcome::new(raw.clone());

        self.parse_stage(&mut state);
        if state.stage != Stage::ParseError {
            self.rules_stage(&mut state);
            self.scoring_stage(&mut state);
        }
        self.escalation_stage(&mut state);

        tracing::debug!(
            claim_id = %state.claim_id(),
            stage = %state.stage,
            findings = state.findings.len(),
            escalated = state.should_escalate,
            "pipeline run complete"
        );
        state
    }

    fn parse_stage(&self, state: &mut PipelineOutcome) {
        match normalize(&state.raw) {
            Ok(record) => {
                state.findings.push(Finding::new(
                    "PARSE-OK",
                    "Claim Parsing",
                    Severity::Info,
                    format!(
                        "Claim {} parsed. ICD: {}, NDC: {}",
                        record.claim_id,
                        record.icd_codes.len(),
                        record.ndc_codes.len()
                    ),
                ));
                state.record = Some(record);
                state.stage = Stage::Parsed;
            }
            Err(error) => {
                state.findings.push(Finding::new(
                    "PARSE-ERR",
                    "Claim Parsing Error",
                    Severity::Critical,
                    format!("Parsing failed: {error}"),
                ));
                state.escalate(format!("Parse error: {error}"));
                state.stage = Stage::ParseError;
            }
        }
    }

    fn rules_stage(&self, state: &mut PipelineOutcome) {
        let Some(record) = state.record.clone() else {
            return;
        };
        // Engine evaluation is pure; a panic inside a built-in check is
        // recovered at this boundary rather than aborting the batch.
        match catch_unwind(AssertUnwindSafe(|| self.engine.validate(&record))) {
            Ok(findings) => {
                let critical_count = findings
                    .iter()
                    .filter(|finding| finding.severity == Severity::Critical)
                    .count();
                state.findings.extend(findings);
                if critical_count > 0 {
                    state.escalate(format!("{critical_count} CRITICAL violations found"));
                }
                state.stage = Stage::RulesComplete;
            }
            Err(_) => {
                tracing::error!(claim_id = %record.claim_id, "rule engine panicked");
                state.findings.push(Finding::new(
                    "ENGINE-ERR",
                    "Rule Engine Error",
                    Severity::Critical,
                    "Rule engine failed while evaluating the claim.",
                ));
                state.escalate("Rule engine error");
                state.stage = Stage::RulesComplete;
            }
        }
    }

    /// Runs unconditionally after the rule stage, regardless of the
    /// escalation flag.
    fn scoring_stage(&self, state: &mut PipelineOutcome) {
        let (score, level) = score_findings(&state.findings);
        state.metadata = Some(PipelineMetadata {
            risk_score: score,
            risk_level: level,
        });
        state.findings.push(risk_summary_finding(score, level));
        state.stage = Stage::ScoringComplete;
    }

    fn escalation_stage(&self, state: &mut PipelineOutcome) {
        if state.should_escalate {
            state.findings.push(Finding::new(
                "ESCALATE",
                "Escalation Required",
                Severity::Critical,
                format!("Manual review required: {}", state.escalation_reason),
            ));
            state.stage = Stage::Escalated;
        } else {
            state.findings.push(Finding::new(
                "AUTO-APPROVE",
                "Auto-Approved",
                Severity::Pass,
                "Auto-approved: all checks passed.",
            ));
            state.stage = Stage::Approved;
        }
    }
}
