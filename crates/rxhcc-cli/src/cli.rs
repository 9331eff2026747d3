//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "rxhcc",
    version,
    about = "RxHCC claims integrity validator",
    long_about = "Validate insurance claims against medical-coding compliance rules.\n\n\
                  Checks ICD/NDC mapping validity, mutually exclusive diagnoses,\n\
                  GLP-1 off-label use and HCC upcoding, then decides per claim\n\
                  whether to auto-approve or escalate for manual review."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a claims CSV file and print the batch summary.
    Batch(BatchArgs),

    /// Validate a single raw claim JSON document.
    Claim(ClaimArgs),

    /// List the built-in rule catalog.
    Rules,

    /// Generate a synthetic claims CSV for testing.
    Generate(GenerateArgs),
}

#[derive(Parser)]
pub struct BatchArgs {
    /// Path to the claims CSV file.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Write the validated CSV and JSON report into this directory.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ClaimArgs {
    /// Path to a raw claim JSON file, or '-' for stdin.
    #[arg(value_name = "JSON")]
    pub input: String,
}

#[derive(Parser)]
pub struct GenerateArgs {
    /// Output CSV path.
    #[arg(value_name = "OUT-CSV")]
    pub output: PathBuf,

    /// Number of claims to generate.
    #[arg(long, default_value_t = 1000)]
    pub records: usize,

    /// Share of anomalous claims (0.0 to 1.0).
    #[arg(long = "anomaly-rate", default_value_t = 0.15)]
    pub anomaly_rate: f64,

    /// RNG seed; identical seeds reproduce identical files.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
