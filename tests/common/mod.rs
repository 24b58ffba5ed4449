// tests/common/mod.rs
// Shared test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use crossbeam_channel::unbounded;
use kvtail::{
    DiagnosticSink, FixedClock, KeyvalParser, ParserOptions, PrefixExtractor, ProcessingStats,
    ResolvedEvent, TimeWarning,
};

/// Sink that keeps every warning it receives
#[derive(Debug, Default)]
pub struct RecordingSink {
    warnings: Mutex<Vec<TimeWarning>>,
}

impl RecordingSink {
    pub fn count(&self) -> usize {
        self.warnings.lock().unwrap().len()
    }

    pub fn warnings(&self) -> Vec<TimeWarning> {
        self.warnings.lock().unwrap().clone()
    }
}

impl DiagnosticSink for RecordingSink {
    fn warn_time(&self, warning: &TimeWarning) {
        self.warnings.lock().unwrap().push(warning.clone());
    }
}

/// The instant every test parser treats as "now"
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 6, 1, 8, 0, 0).unwrap()
}

/// Build a parser with a frozen clock and a recording diagnostic sink
pub fn build_parser(options: ParserOptions) -> (KeyvalParser, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let parser = KeyvalParser::new(options)
        .expect("parser options should be valid")
        .with_clock(Arc::new(FixedClock(fixed_now())))
        .with_diagnostics(sink.clone());
    (parser, sink)
}

/// Feed `lines` through the parser and collect everything it emits
pub fn run_lines(
    parser: &KeyvalParser,
    lines: &[&str],
    prefix: Option<&dyn PrefixExtractor>,
) -> (Vec<ResolvedEvent>, ProcessingStats) {
    let (line_tx, line_rx) = unbounded();
    for line in lines {
        line_tx.send(line.to_string()).unwrap();
    }
    drop(line_tx);

    let (event_tx, event_rx) = unbounded();
    let stats = parser.process_lines(&line_rx, &event_tx, prefix);
    drop(event_tx);

    (event_rx.iter().collect(), stats)
}
