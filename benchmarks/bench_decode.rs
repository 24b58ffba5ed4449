use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use crossbeam_channel::unbounded;

use kvtail::{decode_line, FixedClock, KeyvalParser, ParserOptions, TimeParser};

const SIMPLE_LINE: &str = "level=info status=200 bytes=5120 cached=false path=/api/v1/users";
const QUOTED_LINE: &str = r#"time="2014-03-10 19:57:38.562264131 -0400 EDT" level=warn msg="slow request \"GET /\"" latency=1.25 user=alice"#;

fn bench_decode_simple(c: &mut Criterion) {
    c.bench_function("decode_simple", |b| {
        b.iter(|| {
            black_box(decode_line(black_box(SIMPLE_LINE)).ok());
        });
    });
}

fn bench_decode_quoted(c: &mut Criterion) {
    c.bench_function("decode_quoted", |b| {
        b.iter(|| {
            black_box(decode_line(black_box(QUOTED_LINE)).ok());
        });
    });
}

fn bench_time_fallback_chain(c: &mut Criterion) {
    let parser = TimeParser::new(None);
    c.bench_function("time_unix_date_last_in_chain", |b| {
        b.iter(|| {
            black_box(parser.parse(black_box("Mon Jan  2 15:04:05 MST 2006")));
        });
    });
}

fn bench_pipeline_throughput(c: &mut Criterion) {
    let parser = KeyvalParser::new(ParserOptions::default().with_num_parsers(4))
        .expect("valid options")
        .with_clock(std::sync::Arc::new(FixedClock(chrono::Utc::now())));
    let lines: Vec<String> = (0..10_000)
        .map(|i| format!("{} seq={}", QUOTED_LINE, i))
        .collect();

    c.bench_function("pipeline_10k_lines_4_workers", |b| {
        b.iter(|| {
            let (line_tx, line_rx) = unbounded();
            for line in &lines {
                line_tx.send(line.clone()).expect("receiver alive");
            }
            drop(line_tx);
            let (event_tx, event_rx) = unbounded();
            let stats = parser.process_lines(&line_rx, &event_tx, None);
            drop(event_tx);
            black_box(event_rx.iter().count());
            black_box(stats);
        });
    });
}

criterion_group!(
    benches,
    bench_decode_simple,
    bench_decode_quoted,
    bench_time_fallback_chain,
    bench_pipeline_throughput
);
criterion_main!(benches);
