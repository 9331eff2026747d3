use thiserror::Error;

/// Raised only when the raw input cannot be interpreted as a mapping at
/// all. Field-level problems (unknown keys, unparsable amounts) degrade to
/// defaults instead.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("claim input is not a mapping: got {0}")]
    NotAMapping(String),
}
