use regex::Regex;

use crate::error::KeyvalError;
use crate::event::PrefixFields;

/// Structured header recognized at the start of a line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixMatch {
    /// Matched header text, stripped from the line before decoding
    pub prefix: String,
    /// Fields captured from the header
    pub fields: PrefixFields,
}

impl PrefixMatch {
    /// Remainder of `line` once the prefix is removed; unchanged if the
    /// prefix is not actually at the start of the line
    pub fn strip<'a>(&self, line: &'a str) -> &'a str {
        line.strip_prefix(self.prefix.as_str()).unwrap_or(line)
    }
}

/// Pulls a header such as a syslog or docker-compose prefix off a raw line
pub trait PrefixExtractor: Send + Sync {
    fn extract(&self, line: &str) -> PrefixMatch;
}

/// Prefix extractor driven by a regex with named capture groups
///
/// Each named group that participates in the match becomes a prefix field.
///
/// # Examples
/// ```ignore
/// RegexPrefixExtractor::new(r"^(?P<date>\S+ \S+) (?P<host>\S+): ")?;
/// ```
#[derive(Debug, Clone)]
pub struct RegexPrefixExtractor {
    regex: Regex,
}

impl RegexPrefixExtractor {
    pub fn new(pattern: &str) -> Result<Self, KeyvalError> {
        let regex = Regex::new(pattern).map_err(|source| KeyvalError::InvalidPrefixPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }
}

impl PrefixExtractor for RegexPrefixExtractor {
    fn extract(&self, line: &str) -> PrefixMatch {
        let Some(captures) = self.regex.captures(line) else {
            return PrefixMatch::default();
        };

        let fields = self
            .regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                captures
                    .name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();

        PrefixMatch {
            prefix: captures
                .get(0)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_syslog_style_prefix() {
        let extractor =
            RegexPrefixExtractor::new(r"^(?P<date>\w{3} +\d+ [\d:]+) (?P<host>\S+) (?P<prog>[^:\[]+)(\[(?P<pid>\d+)\])?: ")
                .unwrap();
        let line = "Oct 11 22:14:15 server01 sshd[1234]: user=alice status=failed";

        let found = extractor.extract(line);

        assert_eq!(found.prefix, "Oct 11 22:14:15 server01 sshd[1234]: ");
        assert_eq!(found.fields.get("host").map(String::as_str), Some("server01"));
        assert_eq!(found.fields.get("prog").map(String::as_str), Some("sshd"));
        assert_eq!(found.fields.get("pid").map(String::as_str), Some("1234"));
        assert_eq!(found.strip(line), "user=alice status=failed");
    }

    #[test]
    fn test_optional_groups_that_do_not_match_are_absent() {
        let extractor =
            RegexPrefixExtractor::new(r"^(?P<prog>[a-z]+)(\[(?P<pid>\d+)\])?: ").unwrap();

        let found = extractor.extract("kernel: level=warn");

        assert_eq!(found.fields.len(), 1);
        assert_eq!(found.fields.get("prog").map(String::as_str), Some("kernel"));
        assert!(!found.fields.contains_key("pid"));
    }

    #[test]
    fn test_no_match_leaves_line_untouched() {
        let extractor = RegexPrefixExtractor::new(r"^(?P<src>\w+) +\| ").unwrap();
        let line = "level=info msg=plain";

        let found = extractor.extract(line);

        assert_eq!(found, PrefixMatch::default());
        assert_eq!(found.strip(line), line);
    }

    #[test]
    fn test_match_not_at_start_is_not_stripped() {
        let extractor = RegexPrefixExtractor::new(r"(?P<src>web_\d+) \| ").unwrap();
        let line = "x=1 web_1 | y=2";

        let found = extractor.extract(line);

        assert_eq!(found.fields.get("src").map(String::as_str), Some("web_1"));
        assert_eq!(found.strip(line), line);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = RegexPrefixExtractor::new("(?P<open").unwrap_err();
        assert!(matches!(err, KeyvalError::InvalidPrefixPattern { .. }));
    }
}
