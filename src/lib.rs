// Core library for kvtail: key=value log lines in, timestamped events out

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod parsers;
pub mod pipeline;
pub mod stats;
pub mod timestamp;

pub use config::{ParserOptions, TimestampFormat, UNIX_TIMESTAMP_FMT};
pub use diagnostics::{DiagnosticSink, TimeWarning, TimeWarningReason, TracingSink};
pub use error::KeyvalError;
pub use event::{DecodedFields, FieldValue, PrefixFields, ResolvedEvent};
pub use parsers::{coerce_value, decode_line, LineParser, LogfmtParser};
pub use pipeline::{
    KeyvalParser, LineFilter, PrefixExtractor, PrefixMatch, RegexPrefixExtractor, SkipReason,
};
pub use stats::ProcessingStats;
pub use timestamp::{Clock, FixedClock, SystemClock, TimeParser, TimestampResolver};
