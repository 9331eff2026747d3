pub mod claim;
pub mod finding;

pub use claim::ClaimRecord;
pub use finding::{Finding, RiskLevel, Severity, max_severity};
