use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::KeyvalError;
use crate::event::DecodedFields;
use crate::parsers::type_conversion::coerce_value;
use crate::parsers::LineParser;

type CharStream<'a> = Peekable<CharIndices<'a>>;

/// Decoder for lines made of `key=value` pairs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogfmtParser;

impl LogfmtParser {
    pub fn new() -> Self {
        Self
    }
}

impl LineParser for LogfmtParser {
    fn parse_line(&self, line: &str) -> Result<DecodedFields, KeyvalError> {
        decode_line(line)
    }
}

/// Decode one line into typed fields
///
/// Blank lines decode to an empty map. Later duplicates of a key replace
/// earlier ones.
pub fn decode_line(line: &str) -> Result<DecodedFields, KeyvalError> {
    let pairs = parse_logfmt_pairs(line)?;

    let mut fields = DecodedFields::with_capacity(pairs.len());
    for (key, value) in pairs {
        fields.insert(key, coerce_value(&value));
    }
    Ok(fields)
}

/// Keys and unquoted values are runs of printable characters other than `=` and `"`
fn is_token_char(ch: char) -> bool {
    ch > ' ' && ch != '=' && ch != '"'
}

/// Split a line into raw (key, value) pairs
///
/// Accepted shapes:
///   key=value  key="quoted value"  key=  key
/// Stray `=` or `"` between pairs is skipped. A bare key gets an empty value.
fn parse_logfmt_pairs(line: &str) -> Result<Vec<(String, String)>, KeyvalError> {
    let mut pairs = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some(&(key_start, ch)) = chars.peek() {
        if !is_token_char(ch) {
            chars.next();
            continue;
        }

        let key_end = consume_token(&mut chars, key_start);
        let key = line[key_start..key_end].to_string();

        if !matches!(chars.peek(), Some(&(_, '='))) {
            pairs.push((key, String::new()));
            continue;
        }
        chars.next(); // consume '='

        let value = match chars.peek().copied() {
            Some((quote_pos, '"')) => {
                chars.next();
                parse_quoted_value(&mut chars, quote_pos)?
            }
            Some((value_start, ch)) if is_token_char(ch) => {
                let value_end = consume_token(&mut chars, value_start);
                line[value_start..value_end].to_string()
            }
            _ => String::new(),
        };

        pairs.push((key, value));
    }

    Ok(pairs)
}

/// Advance over a run of token characters, returning the end byte offset
fn consume_token(chars: &mut CharStream<'_>, start: usize) -> usize {
    let mut end = start;
    while let Some(&(pos, ch)) = chars.peek() {
        if !is_token_char(ch) {
            break;
        }
        end = pos + ch.len_utf8();
        chars.next();
    }
    end
}

/// Read a quoted value; the opening quote has already been consumed
fn parse_quoted_value(chars: &mut CharStream<'_>, quote_pos: usize) -> Result<String, KeyvalError> {
    let mut value = String::new();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '"' => return Ok(value),
            '\\' => {
                let Some((_, escaped)) = chars.next() else {
                    break;
                };
                match escaped {
                    '"' => value.push('"'),
                    '\\' => value.push('\\'),
                    '/' => value.push('/'),
                    'b' => value.push('\u{8}'),
                    'f' => value.push('\u{c}'),
                    'n' => value.push('\n'),
                    'r' => value.push('\r'),
                    't' => value.push('\t'),
                    'u' => value.push(parse_unicode_escape(chars, pos)?),
                    other => {
                        return Err(KeyvalError::malformed(
                            pos,
                            format!("invalid escape sequence '\\{}'", other),
                        ))
                    }
                }
            }
            _ => value.push(ch),
        }
    }

    Err(KeyvalError::malformed(quote_pos, "unterminated quoted value"))
}

/// Decode the hex digits after `\u`, joining UTF-16 surrogate pairs.
/// Unpaired surrogates become U+FFFD.
fn parse_unicode_escape(chars: &mut CharStream<'_>, pos: usize) -> Result<char, KeyvalError> {
    let high = read_hex4(chars, pos)?;
    if !(0xD800..0xDC00).contains(&high) {
        return Ok(char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER));
    }

    let mut lookahead = chars.clone();
    if let (Some((_, '\\')), Some((_, 'u'))) = (lookahead.next(), lookahead.next()) {
        if let Ok(low) = read_hex4(&mut lookahead, pos) {
            if (0xDC00..0xE000).contains(&low) {
                *chars = lookahead;
                let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                return Ok(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
        }
    }

    Ok(char::REPLACEMENT_CHARACTER)
}

fn read_hex4(chars: &mut CharStream<'_>, pos: usize) -> Result<u32, KeyvalError> {
    let mut code = 0u32;
    for _ in 0..4 {
        let digit = chars
            .next()
            .and_then(|(_, ch)| ch.to_digit(16))
            .ok_or_else(|| KeyvalError::malformed(pos, "invalid unicode escape"))?;
        code = code * 16 + digit;
    }
    Ok(code)
}
