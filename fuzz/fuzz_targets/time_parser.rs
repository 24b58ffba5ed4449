#![no_main]

use kvtail::{TimeParser, TimestampFormat};
use libfuzzer_sys::fuzz_target;

const MAX_FORMAT_LEN: usize = 64;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // First line picks the layout, the rest is the value under test.
    let (format, value) = match input.split_once('\n') {
        Some((format, value)) if format.len() <= MAX_FORMAT_LEN => (format, value),
        _ => ("", input),
    };

    let spec = TimestampFormat::from_spec(format);
    let parser = TimeParser::new(spec.as_ref());
    let _ = parser.parse(value);
});
