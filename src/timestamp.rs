use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::config::{ParserOptions, TimestampFormat};
use crate::diagnostics::{DiagnosticSink, TimeWarning, TimeWarningReason, TracingSink, WarnOnce};
use crate::event::{DecodedFields, FieldValue};

/// Field names consulted, in order, when no time field is configured
pub const TIMESTAMP_FIELD_NAMES: &[&str] = &[
    "time",
    "Time",
    "timestamp",
    "Timestamp",
    "TimeStamp",
    "date",
    "Date",
    "datetime",
    "Datetime",
    "DateTime",
];

/// `2014-03-10 19:57:38.562264131 -0400 EDT`, zone name excluded
const ZONED_DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S%.f %z";
/// `Jan 02 15:04:05 -0700 2006` once the weekday is dropped
const RUBY_DATE_FMT: &str = "%b %d %H:%M:%S %z %Y";
/// `Jan  2 15:04:05 2006` once the weekday and zone name are dropped
const UNIX_DATE_FMT: &str = "%b %d %H:%M:%S %Y";
/// Weekday tokens accepted, but not checked against the date, in legacy layouts
const WEEKDAY_ABBREVIATIONS: &[&str] = &["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
/// Rendering of the clock used when a configured time field has an unusable type
const CLOCK_RENDER_FMT: &str = "%Y-%m-%d %H:%M:%S%.9f %z UTC";

/// Source of "now" for events without a usable timestamp
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// One way of reading a time string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeLayout {
    UnixSeconds,
    Pattern(String),
    ZonedDateTime,
    Rfc3339,
    RubyDate,
    UnixDate,
}

impl TimeLayout {
    pub fn parse(&self, value: &str) -> Option<DateTime<Utc>> {
        match self {
            TimeLayout::UnixSeconds => value
                .parse::<i64>()
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
            TimeLayout::Pattern(pattern) => parse_with_pattern(value, pattern),
            TimeLayout::ZonedDateTime => parse_zoned_datetime(value),
            TimeLayout::Rfc3339 => DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            TimeLayout::RubyDate => parse_ruby_date(value),
            TimeLayout::UnixDate => parse_unix_date(value),
        }
    }
}

/// Ordered list of layouts tried until one matches
#[derive(Debug, Clone)]
pub struct TimeParser {
    layouts: Vec<TimeLayout>,
}

impl TimeParser {
    /// Configured format first, then the fixed fallback chain
    pub fn new(format: Option<&TimestampFormat>) -> Self {
        let mut layouts = Vec::new();

        match format {
            Some(TimestampFormat::UnixSeconds) => layouts.push(TimeLayout::UnixSeconds),
            Some(TimestampFormat::Pattern(pattern)) => {
                let pattern = pattern.replace(',', ".");
                if pattern.contains('%') {
                    let translated = convert_strftime(&pattern);
                    if translated != pattern {
                        layouts.push(TimeLayout::Pattern(translated));
                    }
                }
                layouts.push(TimeLayout::Pattern(pattern));
            }
            None => {}
        }

        layouts.extend([
            TimeLayout::ZonedDateTime,
            TimeLayout::Rfc3339,
            TimeLayout::RubyDate,
            TimeLayout::UnixDate,
        ]);

        Self { layouts }
    }

    /// Returns None when no layout matches
    pub fn parse(&self, raw: &str) -> Option<DateTime<Utc>> {
        let value = raw.replace(',', ".");
        self.layouts.iter().find_map(|layout| layout.parse(&value))
    }

    pub fn layouts(&self) -> &[TimeLayout] {
        &self.layouts
    }
}

/// Translate C/Ruby strftime directives that chrono spells differently
///
/// - %L (milliseconds) -> %3f
/// - %N (nanoseconds) -> %9f
/// - %f (microseconds) -> %6f
pub fn convert_strftime(format: &str) -> String {
    let mut converted = String::with_capacity(format.len() + 4);
    let mut chars = format.chars();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            converted.push(ch);
            continue;
        }
        match chars.next() {
            Some('L') => converted.push_str("%3f"),
            Some('N') => converted.push_str("%9f"),
            Some('f') => converted.push_str("%6f"),
            Some(other) => {
                converted.push('%');
                converted.push(other);
            }
            None => converted.push('%'),
        }
    }

    converted
}

/// Patterns without an offset read as UTC; date-only patterns as midnight UTC
fn parse_with_pattern(value: &str, pattern: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_str(value, pattern) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive_dt) = NaiveDateTime::parse_from_str(value, pattern) {
        return Some(naive_dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, pattern) {
        return date.and_hms_opt(0, 0, 0).map(|naive_dt| naive_dt.and_utc());
    }
    None
}

/// Zone abbreviations: 3 to 5 uppercase letters (`EDT`, `UTC`) or `±hh[mm]`
///
/// The name is only validated; the numeric offset is authoritative.
fn is_zone_name(zone: &str) -> bool {
    if let Some(digits) = zone.strip_prefix(['+', '-']) {
        return matches!(digits.len(), 2 | 4) && digits.bytes().all(|b| b.is_ascii_digit());
    }
    (3..=5).contains(&zone.len()) && zone.bytes().all(|b| b.is_ascii_uppercase())
}

fn is_weekday(token: &str) -> bool {
    WEEKDAY_ABBREVIATIONS.contains(&token)
}

fn parse_zoned_datetime(value: &str) -> Option<DateTime<Utc>> {
    let (datetime, zone) = value.rsplit_once(' ')?;
    if !is_zone_name(zone) {
        return None;
    }
    DateTime::parse_from_str(datetime, ZONED_DATETIME_FMT)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_ruby_date(value: &str) -> Option<DateTime<Utc>> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    let [weekday, month, day, time, offset, year] = parts.as_slice() else {
        return None;
    };
    if !is_weekday(weekday) {
        return None;
    }

    let without_weekday = format!("{} {} {} {} {}", month, day, time, offset, year);
    DateTime::parse_from_str(&without_weekday, RUBY_DATE_FMT)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// The zone name carries no offset, so the result is read as UTC
fn parse_unix_date(value: &str) -> Option<DateTime<Utc>> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    let [weekday, month, day, time, zone, year] = parts.as_slice() else {
        return None;
    };
    if !is_weekday(weekday) || !is_zone_name(zone) {
        return None;
    }

    let without_zone = format!("{} {} {} {}", month, day, time, year);
    NaiveDateTime::parse_from_str(&without_zone, UNIX_DATE_FMT)
        .ok()
        .map(|naive_dt| naive_dt.and_utc())
}

/// Picks the event time out of a decoded line
///
/// With a configured field, that field is always removed from the line.
/// Without one, the first candidate field that parses is removed; candidates
/// that fail to parse stay in place. Whenever no time can be found the clock
/// supplies one, and the first such failure is reported to the sink.
pub struct TimestampResolver {
    time_field: Option<String>,
    parser: TimeParser,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn DiagnosticSink>,
    warned: WarnOnce,
}

impl TimestampResolver {
    pub fn new(options: &ParserOptions) -> Self {
        Self {
            time_field: options.time_field().map(str::to_string),
            parser: TimeParser::new(options.timestamp_format().as_ref()),
            clock: Arc::new(SystemClock),
            sink: Arc::new(TracingSink),
            warned: WarnOnce::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Whether the one-time warning has already been spent
    pub fn has_warned(&self) -> bool {
        self.warned.has_fired()
    }

    pub fn resolve(&self, fields: &mut DecodedFields) -> DateTime<Utc> {
        match &self.time_field {
            Some(field) => self.resolve_configured(field, fields),
            None => self.resolve_inferred(fields),
        }
    }

    fn resolve_configured(&self, field: &str, fields: &mut DecodedFields) -> DateTime<Utc> {
        let Some(value) = fields.shift_remove(field) else {
            self.warn(field, None, TimeWarningReason::MissingField);
            return self.clock.now();
        };

        let raw = match &value {
            FieldValue::Str(s) => s.clone(),
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Bool(_) | FieldValue::Float(_) => {
                self.warn(field, Some(value.clone()), TimeWarningReason::UnknownType);
                // The rendered clock, not the offending value, goes through the layouts
                self.clock.now().format(CLOCK_RENDER_FMT).to_string()
            }
        };

        match self.parser.parse(&raw) {
            Some(ts) => ts,
            None => {
                self.warn(field, Some(value), TimeWarningReason::UnparseableField);
                self.clock.now()
            }
        }
    }

    fn resolve_inferred(&self, fields: &mut DecodedFields) -> DateTime<Utc> {
        for name in TIMESTAMP_FIELD_NAMES {
            let raw = match fields.get(*name) {
                Some(FieldValue::Str(s)) => s.clone(),
                _ => continue,
            };

            if let Some(ts) = self.parser.parse(&raw) {
                fields.shift_remove(*name);
                return ts;
            }
            self.warn(
                name,
                Some(FieldValue::Str(raw)),
                TimeWarningReason::UnparseableInferredField,
            );
        }

        self.clock.now()
    }

    fn warn(&self, field: &str, value: Option<FieldValue>, reason: TimeWarningReason) {
        if !self.warned.try_claim() {
            return;
        }
        self.sink.warn_time(&TimeWarning {
            field: field.to_string(),
            value,
            reason,
        });
    }
}
