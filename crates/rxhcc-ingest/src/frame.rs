//! Polars bridge: claims CSV reading and row extraction.
//!
//! Batch tabular input reuses the same normalizer as single-claim input:
//! each DataFrame row is lowered to a raw string-keyed mapping first, so
//! alias handling and code splitting live in exactly one place.

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::{AnyValue, CsvReadOptions, DataFrame, SerReader};
use serde_json::{Map, Value};

/// Converts a polars `AnyValue` to its string representation. Nulls become
/// the empty string; floats drop trailing zeros.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Lowers one DataFrame row to a raw claim mapping of column name to
/// string value, ready for [`crate::normalize`].
pub fn raw_record_from_row(df: &DataFrame, idx: usize) -> Value {
    let mut raw = Map::new();
    for column in df.get_columns() {
        let value = column.get(idx).unwrap_or(AnyValue::Null);
        raw.insert(
            column.name().to_string(),
            Value::String(any_to_string(value)),
        );
    }
    Value::Object(raw)
}

/// Reads a claims CSV into a DataFrame.
pub fn read_claims_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to create CSV reader: {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to read claims CSV: {}", path.display()))?;
    Ok(df)
}
