use thiserror::Error;

/// Failures surfaced by the keyval parser
///
/// Only the pattern variants are fatal, and only at construction time.
/// `MalformedLine` is reported per line and the pipeline skips the line.
#[derive(Debug, Error)]
pub enum KeyvalError {
    #[error("malformed key=value line at byte {position}: {reason}")]
    MalformedLine { position: usize, reason: String },

    #[error("invalid filter pattern '{pattern}'")]
    InvalidFilterPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid prefix pattern '{pattern}'")]
    InvalidPrefixPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl KeyvalError {
    pub(crate) fn malformed(position: usize, reason: impl Into<String>) -> Self {
        KeyvalError::MalformedLine {
            position,
            reason: reason.into(),
        }
    }
}
