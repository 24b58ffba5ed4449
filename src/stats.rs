use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counts for one `process_lines` run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    pub lines_read: usize,
    pub lines_filtered: usize,
    pub lines_malformed: usize,
    pub lines_degenerate: usize,
    pub events_emitted: usize,
    pub processing_time: Duration,
}

impl ProcessingStats {
    /// Lines that produced no event, for any reason
    pub fn lines_skipped(&self) -> usize {
        self.lines_filtered + self.lines_malformed + self.lines_degenerate
    }
}

impl fmt::Display for ProcessingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lines processed: {} total, {} emitted, {} filtered, {} malformed, {} degenerate",
            self.lines_read,
            self.events_emitted,
            self.lines_filtered,
            self.lines_malformed,
            self.lines_degenerate
        )?;
        write!(f, " ({}ms)", self.processing_time.as_millis())
    }
}

/// Counters shared by the workers of one run
#[derive(Debug)]
pub(crate) struct StatsCollector {
    lines_read: AtomicUsize,
    lines_filtered: AtomicUsize,
    lines_malformed: AtomicUsize,
    lines_degenerate: AtomicUsize,
    events_emitted: AtomicUsize,
    start_time: Instant,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            lines_read: AtomicUsize::new(0),
            lines_filtered: AtomicUsize::new(0),
            lines_malformed: AtomicUsize::new(0),
            lines_degenerate: AtomicUsize::new(0),
            events_emitted: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn add_line_read(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_line_filtered(&self) {
        self.lines_filtered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_line_malformed(&self) {
        self.lines_malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_line_degenerate(&self) {
        self.lines_degenerate.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_event_emitted(&self) {
        self.events_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn finish(&self) -> ProcessingStats {
        ProcessingStats {
            lines_read: self.lines_read.load(Ordering::Relaxed),
            lines_filtered: self.lines_filtered.load(Ordering::Relaxed),
            lines_malformed: self.lines_malformed.load(Ordering::Relaxed),
            lines_degenerate: self.lines_degenerate.load(Ordering::Relaxed),
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
            processing_time: self.start_time.elapsed(),
        }
    }
}
