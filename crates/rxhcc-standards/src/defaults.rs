//! Built-in rule tables.
//!
//! A fixed illustrative subset of ICD-10 / NDC / HCC coding relationships,
//! sufficient for the compliance checks the engine runs. Not a substitute
//! for a terminology database.

use rxhcc_model::Severity;

use crate::catalog::{ConflictRule, Glp1Rules, HccUpcodingRule, IcdNdcMapping};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

pub(crate) fn icd_ndc_mappings() -> Vec<IcdNdcMapping> {
    vec![
        IcdNdcMapping {
            icd_prefix: "E11".to_string(),
            valid_ndc_prefixes: strings(&[
                "00002-1433", // Metformin (Glucophage)
                "00002-1434", // Metformin ER
                "00169-4060", // Ozempic (semaglutide)
                "00169-4130", // Victoza (liraglutide)
                "00002-7515", // Trulicity (dulaglutide)
                "00088-2220", // Jardiance (empagliflozin)
                "00078-0431", // Invokana (canagliflozin)
                "55111-0396", // Glipizide
            ]),
            description: "Type 2 Diabetes Mellitus".to_string(),
        },
        IcdNdcMapping {
            icd_prefix: "E10".to_string(),
            valid_ndc_prefixes: strings(&[
                "00088-2500", // Lantus (insulin glargine)
                "00169-7501", // NovoLog (insulin aspart)
                "00002-7714", // Humalog (insulin lispro)
                "00169-3919", // Levemir (insulin detemir)
                "00169-4130", // Tresiba (insulin degludec)
            ]),
            description: "Type 1 Diabetes Mellitus".to_string(),
        },
        IcdNdcMapping {
            icd_prefix: "I10".to_string(),
            valid_ndc_prefixes: strings(&[
                "00071-0155", // Norvasc (amlodipine)
                "00781-1506", // Lisinopril
                "00378-4145", // Losartan
                "00591-0405", // Hydrochlorothiazide
                "68180-0519", // Metoprolol
            ]),
            description: "Essential Hypertension".to_string(),
        },
        IcdNdcMapping {
            icd_prefix: "E66".to_string(),
            valid_ndc_prefixes: strings(&[
                "00169-4060", // Wegovy (semaglutide, weight mgmt)
                "76431-0220", // Contrave
                "65757-0300", // Qsymia
                "00032-5200", // Xenical (orlistat)
            ]),
            description: "Obesity".to_string(),
        },
        IcdNdcMapping {
            icd_prefix: "J44".to_string(),
            valid_ndc_prefixes: strings(&[
                "00173-0717", // Advair
                "00597-0075", // Spiriva (tiotropium)
                "00078-0610", // Breo Ellipta
                "00310-0200", // Symbicort
            ]),
            description: "Chronic Obstructive Pulmonary Disease".to_string(),
        },
    ]
}

pub(crate) fn conflict_rules() -> Vec<ConflictRule> {
    vec![
        ConflictRule {
            rule_id: "CONFLICT-001".to_string(),
            name: "Type 1/Type 2 Diabetes Conflict".to_string(),
            codes_a: strings(&["E10"]),
            codes_b: strings(&["E11"]),
            severity: Severity::Critical,
            message: "Type 1 (E10) and type 2 (E11) diabetes coded on the same claim; \
                      the diagnoses are mutually exclusive."
                .to_string(),
        },
        ConflictRule {
            rule_id: "CONFLICT-002".to_string(),
            name: "Diabetes Remission Conflict".to_string(),
            codes_a: strings(&["E11"]),
            codes_b: strings(&["Z86.39"]),
            severity: Severity::Warning,
            message: "Active diabetes (E11) coded together with personal history of \
                      diabetes (Z86.39); coding review needed."
                .to_string(),
        },
        ConflictRule {
            rule_id: "CONFLICT-003".to_string(),
            name: "Asthma/COPD Overlap Check".to_string(),
            codes_a: strings(&["J45"]),
            codes_b: strings(&["J44"]),
            severity: Severity::Warning,
            message: "Asthma (J45) and COPD (J44) coded together; confirm asthma-COPD \
                      overlap before approval."
                .to_string(),
        },
    ]
}

pub(crate) fn glp1_rules() -> Glp1Rules {
    Glp1Rules {
        ndc_prefixes: strings(&[
            "00169-4060", // semaglutide (Ozempic/Wegovy)
            "00169-4130", // liraglutide (Victoza/Saxenda)
            "00002-7515", // dulaglutide (Trulicity)
        ]),
        approved_icd_prefixes: strings(&["E11", "E66"]),
        type1_icd_prefix: "E10".to_string(),
    }
}

pub(crate) fn hcc_upcoding_rules() -> Vec<HccUpcodingRule> {
    vec![
        HccUpcodingRule {
            hcc_code: "HCC18".to_string(),
            expected_icds: strings(&["E11.65", "E11.69", "E13.65"]),
            description: "Diabetes with Chronic Complications".to_string(),
            risk_score_impact: 0.302,
        },
        HccUpcodingRule {
            hcc_code: "HCC19".to_string(),
            expected_icds: strings(&["E11.9", "E11.8"]),
            description: "Diabetes without Complication".to_string(),
            risk_score_impact: 0.104,
        },
        HccUpcodingRule {
            hcc_code: "HCC85".to_string(),
            expected_icds: strings(&["I50.20", "I50.22", "I50.32"]),
            description: "Congestive Heart Failure".to_string(),
            risk_score_impact: 0.331,
        },
    ]
}
