//! Rule catalog for claim compliance validation.
//!
//! The catalog bundles the four rule tables the engine evaluates:
//! ICD-to-NDC mappings, mutually-exclusive ICD conflict rules, GLP-1
//! drug-class rules, and HCC upcoding mappings. Tables are immutable at
//! evaluation time; replacement happens at engine construction via the
//! builder methods on [`RuleCatalog`], so test engines with different
//! catalogs never share mutable state.
//!
//! The built-in tables are a fixed illustrative subset of real coding
//! standards, not a terminology database.

mod catalog;
mod defaults;

pub use catalog::{ConflictRule, Glp1Rules, HccUpcodingRule, IcdNdcMapping, RuleCatalog};

/// Extracts the ICD category prefix used for table lookups.
///
/// The category is the substring before the first `.` (e.g. `E11.65` →
/// `E11`), otherwise the first three characters. Codes shorter than three
/// characters are returned whole. Input is trimmed and uppercased.
pub fn icd_category_prefix(code: &str) -> String {
    let code = code.trim().to_uppercase();
    match code.split_once('.') {
        Some((category, _)) => category.to_string(),
        None => code.chars().take(3).collect(),
    }
}
