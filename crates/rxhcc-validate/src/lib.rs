//! Claim compliance validation: rule engine, risk scoring, escalation
//! pipeline and batch aggregation.

pub mod batch;
pub mod engine;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod synth;

pub use batch::{BatchSummary, RecordResult, summarize, validate_dataframe, validate_records};
pub use engine::{CustomRule, RuleEngine};
pub use pipeline::{PipelineMetadata, PipelineOutcome, Stage, ValidationPipeline};
pub use report::{write_validated_csv, write_validation_report_json};
pub use scoring::score_findings;
pub use synth::{SyntheticClaimGenerator, SynthOptions};
