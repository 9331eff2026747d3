//! Seeded synthetic claim generation.
//!
//! Produces raw claim mappings covering normal scenarios and the anomaly
//! kinds the rule engine detects, labeled with an `anomaly_type` column so
//! batch summaries can report detection per category. Deterministic for a
//! given seed; a small LCG keeps the crate free of an RNG dependency.

use serde_json::{Value, json};

const ICD_DIABETES_T2: &[&str] = &["E11.9", "E11.65", "E11.21", "E11.22", "E11.40"];
const ICD_DIABETES_T1: &[&str] = &["E10.9", "E10.65", "E10.10"];
const ICD_HYPERTENSION: &[&str] = &["I10", "I11.9", "I12.9"];
const ICD_COPD: &[&str] = &["J44.0", "J44.1", "J44.9"];

const NDC_METFORMIN: &[&str] = &["00002-1433-80", "00002-1434-80"];
const NDC_GLP1: &[&str] = &["00169-4060-12", "00169-4130-12", "00002-7515-01"];
const NDC_INSULIN: &[&str] = &["00088-2500-33", "00169-7501-11", "00002-7714-01"];
const NDC_ANTIHYPERTENSIVE: &[&str] = &["00071-0155-23", "00781-1506-01", "00378-4145-01"];
const NDC_COPD_INHALERS: &[&str] = &["00173-0717-20", "00597-0075-75"];

const HCC_DIABETES: &[&str] = &["HCC18", "HCC19"];
const HCC_RESPIRATORY: &[&str] = &["HCC111", "HCC112"];

const ANOMALY_KINDS: &[&str] = &[
    "icd_conflict",
    "glp1_misuse",
    "hcc_upcoding",
    "ndc_mismatch",
    "duplicate_claim",
];

#[derive(Debug, Clone, Copy)]
pub struct SynthOptions {
    pub records: usize,
    /// Share of anomalous records, clamped to 0..=1.
    pub anomaly_rate: f64,
    pub seed: u64,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            records: 1000,
            anomaly_rate: 0.15,
            seed: 42,
        }
    }
}

/// Deterministic synthetic claim generator.
#[derive(Debug)]
pub struct SyntheticClaimGenerator {
    state: u64,
}

impl SyntheticClaimGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_mul(2862933555777941757).wrapping_add(1),
        }
    }

    /// Generates the requested number of raw claim mappings; normal
    /// records first, then anomalies.
    pub fn generate(&mut self, options: &SynthOptions) -> Vec<Value> {
        let rate = options.anomaly_rate.clamp(0.0, 1.0);
        let anomalies = (options.records as f64 * rate) as usize;
        let normal = options.records - anomalies;

        let mut records = Vec::with_capacity(options.records);
        for i in 0..normal {
            records.push(self.normal_record(&format!("CLM-{i:06}")));
        }
        for i in 0..anomalies {
            let claim_id = format!("CLM-A{i:05}");
            let kind = ANOMALY_KINDS[self.pick_index(ANOMALY_KINDS.len())];
            records.push(match kind {
                "icd_conflict" => self.icd_conflict_record(&claim_id),
                "glp1_misuse" => self.glp1_misuse_record(&claim_id),
                "hcc_upcoding" => self.hcc_upcoding_record(&claim_id),
                "ndc_mismatch" => self.ndc_mismatch_record(&claim_id),
                _ => self.duplicate_suspect_record(&claim_id),
            });
        }
        tracing::info!(
            total = records.len(),
            normal,
            anomalies,
            "generated synthetic claims"
        );
        records
    }

    fn normal_record(&mut self, claim_id: &str) -> Value {
        let (icd, ndc, hcc) = match self.pick_index(3) {
            0 => (
                self.pick(ICD_DIABETES_T2),
                self.pick(NDC_METFORMIN),
                self.pick(HCC_DIABETES),
            ),
            1 => (
                self.pick(ICD_HYPERTENSION),
                self.pick(NDC_ANTIHYPERTENSIVE),
                "",
            ),
            _ => (
                self.pick(ICD_COPD),
                self.pick(NDC_COPD_INHALERS),
                self.pick(HCC_RESPIRATORY),
            ),
        };
        self.record(claim_id, icd.to_string(), ndc, hcc, 50.0, 5000.0, "NORMAL")
    }

    fn icd_conflict_record(&mut self, claim_id: &str) -> Value {
        let icds = format!(
            "{},{}",
            self.pick(ICD_DIABETES_T1),
            self.pick(ICD_DIABETES_T2)
        );
        let ndc = self.pick(NDC_INSULIN);
        self.record(
            claim_id,
            icds,
            ndc,
            "HCC18,HCC19",
            500.0,
            15000.0,
            "ICD_CONFLICT",
        )
    }

    fn glp1_misuse_record(&mut self, claim_id: &str) -> Value {
        let icd = self.pick(ICD_HYPERTENSION);
        let ndc = self.pick(NDC_GLP1);
        self.record(claim_id, icd.to_string(), ndc, "", 800.0, 3000.0, "GLP1_MISUSE")
    }

    fn hcc_upcoding_record(&mut self, claim_id: &str) -> Value {
        // Uncomplicated diabetes coded against the complications HCC.
        let ndc = self.pick(NDC_METFORMIN);
        self.record(
            claim_id,
            "E11.9".to_string(),
            ndc,
            "HCC18",
            2000.0,
            20000.0,
            "HCC_UPCODING",
        )
    }

    fn ndc_mismatch_record(&mut self, claim_id: &str) -> Value {
        let icd = self.pick(ICD_HYPERTENSION);
        let ndc = self.pick(NDC_INSULIN);
        self.record(
            claim_id,
            icd.to_string(),
            ndc,
            "",
            200.0,
            1500.0,
            "NDC_MISMATCH",
        )
    }

    fn duplicate_suspect_record(&mut self, claim_id: &str) -> Value {
        let mut record = self.normal_record(claim_id);
        if let Some(map) = record.as_object_mut() {
            map.insert("anomaly_type".to_string(), json!("DUPLICATE_SUSPECT"));
        }
        record
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &mut self,
        claim_id: &str,
        icd_codes: String,
        ndc: &str,
        hcc: &str,
        amount_lo: f64,
        amount_hi: f64,
        anomaly_type: &str,
    ) -> Value {
        let patient = 10000 + self.pick_index(90000);
        let provider = 1000 + self.pick_index(9000);
        let day = self.pick_index(365);
        json!({
            "claim_id": claim_id,
            "patient_id": format!("PAT-{patient}"),
            "icd_codes": icd_codes,
            "ndc_codes": ndc,
            "hcc_codes": hcc,
            "provider_id": format!("PRV-{provider}"),
            "claim_date": date_for_day_offset(day),
            "claim_amount": self.amount(amount_lo, amount_hi),
            "anomaly_type": anomaly_type,
        })
    }

    fn next(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    fn pick_index(&mut self, n: usize) -> usize {
        ((self.next() >> 33) as usize) % n.max(1)
    }

    fn pick(&mut self, pool: &[&'static str]) -> &'static str {
        pool[self.pick_index(pool.len())]
    }

    fn amount(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next() >> 11) as f64 / (1u64 << 53) as f64;
        let amount = lo + unit * (hi - lo);
        (amount * 100.0).round() / 100.0
    }
}

/// Day offsets map into 2024, matching the window of the historical feeds.
fn date_for_day_offset(day: usize) -> String {
    const MONTH_DAYS: [usize; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let mut remaining = day % 366;
    for (month, days) in MONTH_DAYS.iter().enumerate() {
        if remaining < *days {
            return format!("2024-{:02}-{:02}", month + 1, remaining + 1);
        }
        remaining -= days;
    }
    "2024-12-31".to_string()
}
