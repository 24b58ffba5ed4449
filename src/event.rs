use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A single typed value decoded from a `key=value` pair
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Field name to typed value, one per decoded line
pub type DecodedFields = IndexMap<String, FieldValue>;

/// Fields captured from a line prefix; always plain strings
pub type PrefixFields = HashMap<String, String>;

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Kind name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::Str(_) => "string",
        }
    }

    fn is_empty_string(&self) -> bool {
        matches!(self, FieldValue::Str(s) if s.is_empty())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// True when a decoded line carries no usable signal: no fields at all,
/// or nothing but empty strings
pub fn is_degenerate(fields: &DecodedFields) -> bool {
    fields.values().all(FieldValue::is_empty_string)
}

/// Merge prefix-derived fields into a decoded line; prefix values win on collision
pub fn merge_prefix_fields(fields: &mut DecodedFields, prefix_fields: PrefixFields) {
    for (key, value) in prefix_fields {
        fields.insert(key, FieldValue::Str(value));
    }
}

/// A fully parsed line ready for transmission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEvent {
    pub timestamp: DateTime<Utc>,
    pub data: DecodedFields,
}

impl ResolvedEvent {
    pub fn new(timestamp: DateTime<Utc>, data: DecodedFields) -> Self {
        Self { timestamp, data }
    }

    /// Render the event as a single JSON object
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
