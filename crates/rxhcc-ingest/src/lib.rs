pub mod error;
pub mod frame;
pub mod normalize;

pub use error::NormalizeError;
pub use frame::{any_to_string, raw_record_from_row, read_claims_csv};
pub use normalize::normalize;
