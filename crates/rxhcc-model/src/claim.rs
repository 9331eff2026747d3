use serde::{Deserialize, Serialize};

/// Canonical representation of one insurance claim.
///
/// Code sequences preserve input order for display; matching never depends
/// on order. Normalization guarantees no code entry is blank and
/// `claim_amount` is non-negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub claim_id: String,
    pub patient_id: String,
    /// Diagnosis codes (ICD-10).
    pub icd_codes: Vec<String>,
    /// Dispensed drug codes (NDC).
    pub ndc_codes: Vec<String>,
    /// Risk-adjustment category codes (HCC).
    pub hcc_codes: Vec<String>,
    pub provider_id: String,
    /// Opaque date string; the core never parses it.
    pub claim_date: String,
    pub claim_amount: f64,
}

impl ClaimRecord {
    /// Convenience constructor for the common case of a claim identified by
    /// id with diagnosis and drug codes.
    pub fn with_codes(
        claim_id: impl Into<String>,
        icd_codes: Vec<String>,
        ndc_codes: Vec<String>,
    ) -> Self {
        Self {
            claim_id: claim_id.into(),
            icd_codes,
            ndc_codes,
            ..Self::default()
        }
    }
}
