use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Format specifier meaning "integer seconds since the Unix epoch"
pub const UNIX_TIMESTAMP_FMT: &str = "%s";

/// How the configured time format should be applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampFormat {
    /// Integer seconds since the epoch
    UnixSeconds,
    /// strftime-style or chrono pattern
    Pattern(String),
}

impl TimestampFormat {
    /// Interpret a raw format option; blank means no format
    pub fn from_spec(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            None
        } else if spec == UNIX_TIMESTAMP_FMT {
            Some(TimestampFormat::UnixSeconds)
        } else {
            Some(TimestampFormat::Pattern(spec.to_string()))
        }
    }
}

/// Parser configuration, fixed for the lifetime of one parser
///
/// Deserializable so a host can embed it in its own config file; every
/// field is optional there.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Name of the field that holds the event time
    pub timefield: Option<String>,
    /// Format of the time field (`%s`, strftime, or chrono pattern)
    pub format: Option<String>,
    /// Only lines matching this regex are parsed
    pub filter_regex: Option<String>,
    /// Parse only lines that do *not* match `filter_regex`
    pub invert_filter: bool,
    /// Number of worker threads
    pub num_parsers: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            timefield: None,
            format: None,
            filter_regex: None,
            invert_filter: false,
            num_parsers: num_cpus::get(),
        }
    }
}

impl ParserOptions {
    /// Parse options from a JSON document; absent keys take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse parser options")
    }

    /// Read options from a JSON file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file: {}", path.display()))?;
        Self::from_json_str(&contents)
            .with_context(|| format!("Invalid options in {}", path.display()))
    }

    pub fn with_timefield(mut self, field: impl Into<String>) -> Self {
        self.timefield = Some(field.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_filter(mut self, pattern: impl Into<String>, invert: bool) -> Self {
        self.filter_regex = Some(pattern.into());
        self.invert_filter = invert;
        self
    }

    pub fn with_num_parsers(mut self, num_parsers: usize) -> Self {
        self.num_parsers = num_parsers;
        self
    }

    /// Configured time field, ignoring a blank name
    pub fn time_field(&self) -> Option<&str> {
        self.timefield.as_deref().filter(|f| !f.is_empty())
    }

    pub fn timestamp_format(&self) -> Option<TimestampFormat> {
        self.format.as_deref().and_then(TimestampFormat::from_spec)
    }

    /// Configured filter pattern, ignoring a blank one
    pub fn filter_pattern(&self) -> Option<&str> {
        self.filter_regex.as_deref().filter(|p| !p.is_empty())
    }

    /// Worker count, never below one
    pub fn worker_count(&self) -> usize {
        self.num_parsers.max(1)
    }
}
