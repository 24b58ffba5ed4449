pub mod logfmt;
pub mod type_conversion;

pub use logfmt::{decode_line, LogfmtParser};
pub use type_conversion::coerce_value;

use crate::error::KeyvalError;
use crate::event::DecodedFields;

/// Turns one raw line into decoded fields
pub trait LineParser: Send + Sync {
    fn parse_line(&self, line: &str) -> Result<DecodedFields, KeyvalError>;
}
