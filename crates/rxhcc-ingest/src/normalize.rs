//! Conversion of loosely-typed raw claim mappings into [`ClaimRecord`]s.
//!
//! Upstream feeds use several historical key spellings for the code
//! fields and encode code lists either as comma-delimited strings or as
//! arrays. Normalization tolerates all of them; the only hard failure is
//! input that is not a mapping at all.

use serde_json::{Map, Value};

use rxhcc_model::ClaimRecord;

use crate::error::NormalizeError;

/// Candidate keys per code field, tried in priority order.
const ICD_ALIASES: &[&str] = &["icd_codes", "icd_code", "diagnosis_code"];
const NDC_ALIASES: &[&str] = &["ndc_codes", "ndc_code", "drug_code"];
const HCC_ALIASES: &[&str] = &["hcc_codes", "hcc_code"];

/// Normalizes a raw claim mapping into a canonical [`ClaimRecord`].
///
/// # Errors
///
/// [`NormalizeError::NotAMapping`] when `raw` is not a JSON object.
pub fn normalize(raw: &Value) -> Result<ClaimRecord, NormalizeError> {
    let map = raw
        .as_object()
        .ok_or_else(|| NormalizeError::NotAMapping(describe_value(raw)))?;

    Ok(ClaimRecord {
        claim_id: string_field(map, "claim_id", "UNKNOWN"),
        patient_id: string_field(map, "patient_id", "UNKNOWN"),
        icd_codes: code_field(map, ICD_ALIASES),
        ndc_codes: code_field(map, NDC_ALIASES),
        hcc_codes: code_field(map, HCC_ALIASES),
        provider_id: string_field(map, "provider_id", ""),
        claim_date: string_field(map, "claim_date", ""),
        claim_amount: amount_field(map),
    })
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(n) => format!("the number {n}"),
        Value::String(s) => format!("the string {s:?}"),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
    }
}

/// First alias whose value is present and non-empty wins. Empty strings
/// and empty arrays fall through to the next alias, matching the legacy
/// feed behavior.
fn first_present<'a>(map: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|key| {
        let value = map.get(*key)?;
        match value {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::Array(items) if items.is_empty() => None,
            _ => Some(value),
        }
    })
}

fn code_field(map: &Map<String, Value>, aliases: &[&str]) -> Vec<String> {
    first_present(map, aliases).map(to_code_list).unwrap_or_default()
}

/// A delimited string is split on commas; a list is used as-is with each
/// entry coerced to a string but never re-split. Blank entries are dropped
/// in both cases. Any other value type yields an empty list: scalar
/// numbers or booleans in a code field are malformed, not a single code.
fn to_code_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(ToString::to_string)
            .collect(),
        Value::Array(items) => items
            .iter()
            .map(coerce_to_string)
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn string_field(map: &Map<String, Value>, key: &str, default: &str) -> String {
    match map.get(key) {
        Some(Value::Null) | None => default.to_string(),
        Some(value) => {
            let coerced = coerce_to_string(value);
            if coerced.is_empty() {
                default.to_string()
            } else {
                coerced
            }
        }
    }
}

/// Missing or unparsable amounts fall back to 0.0 rather than failing the
/// record; negatives clamp to 0.0 to keep the amount invariant.
fn amount_field(map: &Map<String, Value>) -> f64 {
    let amount = match map.get("claim_amount") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or_else(|_| {
            if !s.trim().is_empty() {
                tracing::debug!(raw = %s, "unparsable claim_amount, defaulting to 0.0");
            }
            0.0
        }),
        _ => 0.0,
    };
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn splits_delimited_code_string() {
        let record = normalize(&json!({
            "claim_id": "CLM-002",
            "icd_codes": "E10.9, E11.65 ,,",
            "ndc_codes": "00088-2500-33,00002-1433-80"
        }))
        .expect("normalize");
        assert_eq!(record.icd_codes, vec!["E10.9", "E11.65"]);
        assert_eq!(record.ndc_codes.len(), 2);
    }

    #[test]
    fn list_entries_are_not_resplit() {
        let record = normalize(&json!({
            "claim_id": "CLM-003",
            "icd_codes": ["E11.9", "I10"],
        }))
        .expect("normalize");
        assert_eq!(record.icd_codes, vec!["E11.9", "I10"]);
    }

    #[test]
    fn earlier_alias_wins() {
        let record = normalize(&json!({
            "icd_codes": "E11.9",
            "diagnosis_code": "I10",
        }))
        .expect("normalize");
        assert_eq!(record.icd_codes, vec!["E11.9"]);
    }

    #[test]
    fn empty_alias_value_falls_through() {
        let record = normalize(&json!({
            "icd_codes": "",
            "icd_code": "I10",
        }))
        .expect("normalize");
        assert_eq!(record.icd_codes, vec!["I10"]);
    }

    #[test]
    fn scalar_code_value_yields_empty_list() {
        let record = normalize(&json!({
            "claim_id": "CLM-004",
            "icd_codes": 123,
            "ndc_codes": true,
        }))
        .expect("normalize");
        assert!(record.icd_codes.is_empty());
        assert!(record.ndc_codes.is_empty());
    }

    #[test]
    fn identifier_defaults() {
        let record = normalize(&json!({})).expect("normalize");
        assert_eq!(record.claim_id, "UNKNOWN");
        assert_eq!(record.patient_id, "UNKNOWN");
        assert_eq!(record.provider_id, "");
        assert_eq!(record.claim_date, "");
    }

    #[test]
    fn amount_fallbacks() {
        let record = normalize(&json!({"claim_amount": "not-a-number"})).expect("normalize");
        assert_eq!(record.claim_amount, 0.0);
        let record = normalize(&json!({"claim_amount": "123.45"})).expect("normalize");
        assert_eq!(record.claim_amount, 123.45);
        let record = normalize(&json!({"claim_amount": -10.0})).expect("normalize");
        assert_eq!(record.claim_amount, 0.0);
    }

    #[test]
    fn non_mapping_input_is_an_error() {
        assert!(normalize(&Value::Null).is_err());
        assert!(normalize(&json!([1, 2])).is_err());
        assert!(normalize(&json!("claim")).is_err());
    }
}
