#![no_main]

use kvtail::decode_line;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Malformed lines are fine; we only care about panics.
        if let Ok(fields) = decode_line(input) {
            for key in fields.keys() {
                assert!(!key.is_empty());
                assert!(!key.contains('='));
            }
        }
    }
});
