//! Concurrent keyval line processing
//!
//! A fixed pool of workers drains one shared line channel. Each line is
//! filtered, stripped of its prefix, decoded, given a timestamp and sent on
//! as a `ResolvedEvent`. There is no ordering across workers; each worker
//! emits its own lines in the order it received them.

pub mod prefix_extractor;

pub use prefix_extractor::{PrefixExtractor, PrefixMatch, RegexPrefixExtractor};

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use regex::Regex;

use crate::config::ParserOptions;
use crate::diagnostics::DiagnosticSink;
use crate::error::KeyvalError;
use crate::event::{is_degenerate, merge_prefix_fields, ResolvedEvent};
use crate::parsers::{LineParser, LogfmtParser};
use crate::stats::{ProcessingStats, StatsCollector};
use crate::timestamp::{Clock, TimestampResolver};

/// Why a line produced no event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Rejected by the line filter
    Filtered,
    /// Could not be decoded
    Malformed,
    /// Decoded to no fields, or only empty strings
    Degenerate,
}

/// Regex gate on raw lines
#[derive(Debug, Clone)]
pub struct LineFilter {
    regex: Regex,
    invert: bool,
}

impl LineFilter {
    pub fn new(pattern: &str, invert: bool) -> Result<Self, KeyvalError> {
        let regex = Regex::new(pattern).map_err(|source| KeyvalError::InvalidFilterPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { regex, invert })
    }

    /// Matching lines pass; with `invert`, non-matching lines pass
    pub fn should_keep(&self, line: &str) -> bool {
        self.regex.is_match(line) != self.invert
    }
}

/// Parser for streams of `key=value` log lines
pub struct KeyvalParser {
    options: ParserOptions,
    filter: Option<LineFilter>,
    line_parser: Box<dyn LineParser>,
    resolver: TimestampResolver,
}

impl KeyvalParser {
    /// Build a parser; fails if the filter pattern does not compile
    pub fn new(options: ParserOptions) -> Result<Self, KeyvalError> {
        let filter = options
            .filter_pattern()
            .map(|pattern| LineFilter::new(pattern, options.invert_filter))
            .transpose()?;
        let resolver = TimestampResolver::new(&options);

        Ok(Self {
            options,
            filter,
            line_parser: Box::new(LogfmtParser::new()),
            resolver,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.resolver = self.resolver.with_clock(clock);
        self
    }

    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.resolver = self.resolver.with_sink(sink);
        self
    }

    pub fn with_line_parser(mut self, line_parser: Box<dyn LineParser>) -> Self {
        self.line_parser = line_parser;
        self
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Run every line from `lines` through the worker pool, sending events to `send`
    ///
    /// Blocks until `lines` is closed and fully drained. `send` is never
    /// closed here; it belongs to the caller. A worker stops early only if
    /// every receiver of `send` has gone away.
    pub fn process_lines(
        &self,
        lines: &Receiver<String>,
        send: &Sender<ResolvedEvent>,
        prefix: Option<&dyn PrefixExtractor>,
    ) -> ProcessingStats {
        let stats = StatsCollector::new();
        let num_workers = self.options.worker_count();

        thread::scope(|scope| {
            for worker_id in 0..num_workers {
                let stats = &stats;
                scope.spawn(move || self.worker_loop(worker_id, lines, send, prefix, stats));
            }
        });

        tracing::debug!("lines channel is closed, ending keyval processor");
        stats.finish()
    }

    fn worker_loop(
        &self,
        worker_id: usize,
        lines: &Receiver<String>,
        send: &Sender<ResolvedEvent>,
        prefix: Option<&dyn PrefixExtractor>,
        stats: &StatsCollector,
    ) {
        for line in lines.iter() {
            stats.add_line_read();

            match self.process_line(&line, prefix) {
                Ok(event) => {
                    if send.send(event).is_err() {
                        tracing::debug!(worker_id, "event receiver dropped, stopping worker");
                        return;
                    }
                    stats.add_event_emitted();
                }
                Err(SkipReason::Filtered) => stats.add_line_filtered(),
                Err(SkipReason::Malformed) => stats.add_line_malformed(),
                Err(SkipReason::Degenerate) => stats.add_line_degenerate(),
            }
        }
    }

    /// Turn one raw line into an event, or say why it was skipped
    pub fn process_line(
        &self,
        line: &str,
        prefix: Option<&dyn PrefixExtractor>,
    ) -> Result<ResolvedEvent, SkipReason> {
        tracing::debug!(line, "attempting to process keyval log line");

        if let Some(filter) = &self.filter {
            if !filter.should_keep(line) {
                tracing::debug!(line, invert = filter.invert, "skipping line due to filter");
                return Err(SkipReason::Filtered);
            }
        }

        let (body, prefix_fields) = match prefix {
            Some(extractor) => {
                let found = extractor.extract(line);
                (found.strip(line), Some(found.fields))
            }
            None => (line, None),
        };

        let mut fields = match self.line_parser.parse_line(body) {
            Ok(fields) => fields,
            Err(err) => {
                tracing::debug!(line = body, error = %err, "skipping line; failed to parse");
                return Err(SkipReason::Malformed);
            }
        };
        if fields.is_empty() {
            tracing::debug!(line = body, "skipping line; no key/val pairs found");
            return Err(SkipReason::Degenerate);
        }
        if is_degenerate(&fields) {
            tracing::debug!(line = body, "skipping line; all values are the empty string");
            return Err(SkipReason::Degenerate);
        }

        if let Some(prefix_fields) = prefix_fields {
            merge_prefix_fields(&mut fields, prefix_fields);
        }

        let timestamp = self.resolver.resolve(&mut fields);
        Ok(ResolvedEvent::new(timestamp, fields))
    }
}
