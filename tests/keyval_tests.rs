mod common;
use common::*;

use chrono::{DateTime, Utc};
use kvtail::{FieldValue, ParserOptions, RegexPrefixExtractor, TimeWarningReason};

fn utc(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

fn single_worker() -> ParserOptions {
    ParserOptions::default().with_num_parsers(1)
}

#[test]
fn test_typed_fields_end_to_end() {
    let (parser, _sink) = build_parser(single_worker());
    let (events, stats) = run_lines(&parser, &["foo=1 bar=2.5 baz=true qux=hello"], None);

    assert_eq!(events.len(), 1);
    let data = &events[0].data;
    assert_eq!(data.get("foo"), Some(&FieldValue::Int(1)));
    assert_eq!(data.get("bar"), Some(&FieldValue::Float(2.5)));
    assert_eq!(data.get("baz"), Some(&FieldValue::Bool(true)));
    assert_eq!(data.get("qux"), Some(&FieldValue::Str("hello".to_string())));
    assert_eq!(data.get("bar").and_then(FieldValue::as_float), Some(2.5));
    assert_eq!(data.get("baz").and_then(FieldValue::as_bool), Some(true));
    assert_eq!(events[0].timestamp, fixed_now());
    assert_eq!(stats.events_emitted, 1);
}

#[test]
fn test_blank_and_empty_value_lines_emit_nothing() {
    let (parser, sink) = build_parser(single_worker());
    let (events, stats) = run_lines(&parser, &["", "   ", "a= b=", r#"c="""#], None);

    assert!(events.is_empty());
    assert_eq!(stats.lines_read, 4);
    assert_eq!(stats.lines_degenerate, 4);
    assert_eq!(sink.count(), 0);
}

#[test]
fn test_malformed_lines_are_skipped() {
    let (parser, _sink) = build_parser(single_worker());
    let (events, stats) = run_lines(
        &parser,
        &[r#"msg="oops"#, "status=200", r#"msg="bad \x escape""#],
        None,
    );

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].data.get("status"), Some(&FieldValue::Int(200)));
    assert_eq!(stats.lines_malformed, 2);
}

#[test]
fn test_explicit_time_field_rfc3339() {
    let (parser, sink) = build_parser(single_worker().with_timefield("ts"));
    let (events, _stats) = run_lines(&parser, &["ts=2021-01-02T15:04:05Z foo=1"], None);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].timestamp, utc("2021-01-02T15:04:05Z"));
    assert!(!events[0].data.contains_key("ts"));
    assert_eq!(events[0].data.get("foo"), Some(&FieldValue::Int(1)));
    assert_eq!(sink.count(), 0);
}

#[test]
fn test_inferred_time_field_space_delimited_layout() {
    let (parser, sink) = build_parser(single_worker());
    let (events, _stats) = run_lines(
        &parser,
        &[r#"time="2014-03-10 19:57:38.562264131 -0400 EDT" level=info msg="started""#],
        None,
    );

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].timestamp, utc("2014-03-10T23:57:38.562264131Z"));
    assert!(!events[0].data.contains_key("time"));
    assert_eq!(events[0].data.len(), 2);
    assert_eq!(sink.count(), 0);
}

#[test]
fn test_unresolvable_time_warns_once() {
    let (parser, sink) = build_parser(single_worker().with_timefield("ts"));
    let lines: Vec<String> = (0..50).map(|i| format!("ts=not-a-time n={}", i)).collect();
    let line_refs: Vec<&str> = lines.iter().map(String::as_str).collect();

    let (events, _stats) = run_lines(&parser, &line_refs, None);

    assert_eq!(events.len(), 50);
    assert!(events.iter().all(|e| e.timestamp == fixed_now()));
    assert!(events.iter().all(|e| !e.data.contains_key("ts")));

    let warnings = sink.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field, "ts");
    assert_eq!(warnings[0].reason, TimeWarningReason::UnparseableField);
}

#[test]
fn test_unix_format_option() {
    let (parser, _sink) = build_parser(
        single_worker()
            .with_timefield("epoch")
            .with_format("%s"),
    );
    let (events, _stats) = run_lines(&parser, &["epoch=1609599845 msg=hi"], None);

    assert_eq!(events[0].timestamp, utc("2021-01-02T15:04:05Z"));
    assert!(!events[0].data.contains_key("epoch"));
}

#[test]
fn test_custom_strftime_format_option() {
    let (parser, _sink) = build_parser(
        single_worker()
            .with_timefield("at")
            .with_format("%Y-%m-%d %H:%M:%S,%L"),
    );
    let (events, _stats) = run_lines(&parser, &[r#"at="2021-01-02 15:04:05,250" msg=hi"#], None);

    assert_eq!(events[0].timestamp, utc("2021-01-02T15:04:05.250Z"));
}

#[test]
fn test_filter_keeps_matching_lines() {
    let (parser, _sink) = build_parser(single_worker().with_filter(r"level=(warn|error)", false));
    let (events, stats) = run_lines(
        &parser,
        &["level=info n=1", "level=warn n=2", "level=error n=3", "level=debug n=4"],
        None,
    );

    let kept: Vec<i64> = events
        .iter()
        .map(|e| e.data.get("n").and_then(FieldValue::as_int).unwrap())
        .collect();
    assert_eq!(kept, vec![2, 3]);
    assert_eq!(stats.lines_filtered, 2);
}

#[test]
fn test_inverted_filter_keeps_non_matching_lines() {
    let (parser, _sink) = build_parser(single_worker().with_filter(r"level=(warn|error)", true));
    let (events, _stats) = run_lines(
        &parser,
        &["level=info n=1", "level=warn n=2", "level=error n=3", "level=debug n=4"],
        None,
    );

    let kept: Vec<i64> = events
        .iter()
        .map(|e| e.data.get("n").and_then(FieldValue::as_int).unwrap())
        .collect();
    assert_eq!(kept, vec![1, 4]);
}

#[test]
fn test_filter_sees_the_raw_line_including_prefix() {
    let (parser, _sink) = build_parser(single_worker().with_filter("^web", false));
    let extractor = RegexPrefixExtractor::new(r"^(?P<service>\w+) +\| ").unwrap();
    let (events, _stats) = run_lines(
        &parser,
        &["web  | path=/ status=200", "db   | query=select ms=3"],
        Some(&extractor),
    );

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].data.get("service"), Some(&FieldValue::from("web")));
    assert_eq!(events[0].data.get("status"), Some(&FieldValue::Int(200)));
}

#[test]
fn test_prefix_timestamp_is_used() {
    let (parser, sink) = build_parser(single_worker());
    let extractor =
        RegexPrefixExtractor::new(r"^(?P<timestamp>\S+) (?P<host>\S+) ").unwrap();
    let (events, _stats) = run_lines(
        &parser,
        &["2022-05-06T07:08:09Z api-3 method=GET status=204"],
        Some(&extractor),
    );

    assert_eq!(events[0].timestamp, utc("2022-05-06T07:08:09Z"));
    assert_eq!(events[0].data.get("host"), Some(&FieldValue::from("api-3")));
    assert!(!events[0].data.contains_key("timestamp"));
    assert_eq!(sink.count(), 0);
}

#[test]
fn test_events_serialize_for_transmission() {
    let (parser, _sink) = build_parser(single_worker().with_timefield("ts"));
    let (events, _stats) = run_lines(
        &parser,
        &[r#"ts=2021-01-02T15:04:05Z user=alice latency=0.25 cached=false"#],
        None,
    );

    let json: serde_json::Value = serde_json::from_str(&events[0].to_json().unwrap()).unwrap();
    assert_eq!(json["timestamp"], "2021-01-02T15:04:05Z");
    assert_eq!(json["data"]["user"], "alice");
    assert_eq!(json["data"]["latency"], 0.25);
    assert_eq!(json["data"]["cached"], false);
    assert!(json["data"].get("ts").is_none());
}
