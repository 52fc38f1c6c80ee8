use crate::util::human::{fmt_bytes, unit_multiplier};
use serde::{Serialize, Serializer};
use tracing::warn;

/// Token separating a label from its value inside a report line.
pub const SEPARATOR_ATTRIBUTE: &str = ": ";

/// A byte quantity found in a report, with its rendered form.
#[derive(Debug, Clone, PartialEq)]
pub struct ByteSize {
    pub bytes:   u64,
    pub display: String,
}

/// Best-effort typed value of a `label : value` line.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Flag(bool),
    Size(ByteSize),
    Text(String),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            AttrValue::Size(s) => Some(&s.display),
            AttrValue::Flag(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// Render for display, booleans as Yes/No.
    pub fn render(&self) -> String {
        match self {
            AttrValue::Flag(true)  => "Yes".to_string(),
            AttrValue::Flag(false) => "No".to_string(),
            AttrValue::Size(s)     => s.display.clone(),
            AttrValue::Text(s)     => s.clone(),
        }
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttrValue::Flag(b) => serializer.serialize_bool(*b),
            AttrValue::Size(s) => serializer.serialize_str(&s.display),
            AttrValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// One parsed report line: programmatic name, display key and value.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub key:     String,
    pub display: String,
    pub value:   AttrValue,
}

/// Split `label : value` at the first separator.
pub fn split_attribute(line: &str) -> Option<(&str, &str)> {
    line.split_once(SEPARATOR_ATTRIBUTE)
}

/// Parse a report line into an [`Attribute`].
///
/// Lines without the separator or with a label that normalizes to nothing
/// are reported and skipped.
pub fn parse_attribute(line: &str) -> Option<Attribute> {
    let Some((label, raw)) = split_attribute(line) else {
        warn!(line = line.trim(), "not an attribute line");
        return None;
    };
    let key = normalize_key(label);
    if key.is_empty() {
        warn!(line = line.trim(), "attribute label normalizes to an empty key");
        return None;
    }
    Some(Attribute { key, display: display_key(label), value: coerce_value(raw) })
}

/// Turn a report label into a field name matching `[a-z0-9_]+`.
///
/// "Temperature (C)" becomes "temperature", "Write-cache mode" becomes
/// "write_cache_mode", "12V Rail" becomes "_12v_rail".
pub fn normalize_key(label: &str) -> String {
    let head = label.split('(').next().unwrap_or(label);
    let mut key: String = head
        .trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' | '-' | ',' | '/' => Some('_'),
            '.' => None,
            c if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' => Some(c),
            _ => None,
        })
        .collect();
    if key.starts_with(|c: char| c.is_ascii_digit()) {
        key.insert(0, '_');
    }
    key
}

/// Name-preserving key: first non-dash line, text before the separator and
/// before any parenthesis, trimmed.
pub fn display_key(text: &str) -> String {
    let line = text
        .split('\n')
        .find(|l| !l.trim().is_empty() && !l.trim().bytes().all(|b| b == b'-'))
        .unwrap_or("");
    let label = split_attribute(line).map(|(l, _)| l).unwrap_or(line);
    let label = label.split('(').next().unwrap_or(label).trim();
    if label.is_empty() {
        warn!(text = text.trim(), "empty display key");
    }
    label.to_string()
}

/// Coerce a raw value: byte quantity, then boolean keyword, then text.
pub fn coerce_value(raw: &str) -> AttrValue {
    if let Some(size) = parse_byte_size(raw) {
        return AttrValue::Size(size);
    }
    let value = raw.trim();
    match value.to_lowercase().as_str() {
        "enabled" | "yes" | "true"  => AttrValue::Flag(true),
        "disabled" | "no" | "false" => AttrValue::Flag(false),
        _ => AttrValue::Text(value.to_string()),
    }
}

fn parse_byte_size(raw: &str) -> Option<ByteSize> {
    let mut tokens = raw.split_whitespace();
    let (number, unit) = (tokens.next()?, tokens.next()?);
    if tokens.next().is_some() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let bytes = number.parse::<u64>().ok()?.checked_mul(unit_multiplier(unit)?)?;
    Some(ByteSize { bytes, display: fmt_bytes(bytes) })
}
