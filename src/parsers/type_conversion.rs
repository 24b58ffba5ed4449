use crate::event::FieldValue;

/// Convert a raw value to the narrowest scalar it represents
///
/// Tried in order: boolean literal, integer, float, then the string itself.
/// Never fails; anything that does not narrow stays a string.
///
/// # Examples
/// - "true" -> Bool(true)
/// - "42" -> Int(42)
/// - "2.5" -> Float(2.5)
/// - "hello" -> Str("hello")
pub fn coerce_value(raw: &str) -> FieldValue {
    if let Some(b) = parse_bool_literal(raw) {
        return FieldValue::Bool(b);
    }

    if let Some(i) = parse_int_literal(raw) {
        return FieldValue::Int(i);
    }

    if let Some(f) = parse_float_literal(raw) {
        return FieldValue::Float(f);
    }

    FieldValue::Str(raw.to_string())
}

/// Boolean literals; `1`/`0` are left for the integer rule
fn parse_bool_literal(raw: &str) -> Option<bool> {
    match raw {
        "true" | "True" | "TRUE" | "t" | "T" => Some(true),
        "false" | "False" | "FALSE" | "f" | "F" => Some(false),
        _ => None,
    }
}

/// Optional sign followed by decimal digits, within i64 range
fn parse_int_literal(raw: &str) -> Option<i64> {
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i64>().ok()
}

/// Decimal or exponent notation; textual forms like "inf" and "NaN" stay strings
fn parse_float_literal(raw: &str) -> Option<f64> {
    if !raw.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<f64>().ok().filter(|f| f.is_finite())
}
