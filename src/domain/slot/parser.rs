//! Raw slot text ⇄ structured value entries.
//!
//! Each entry is one list line: `- [condition => ][weight,]value`.
//! Lines without the `- ` marker continue the previous entry's value, which is
//! how multi-line values survive storage. Text that carries no markers at all
//! (plain wildcard files) is read one entry per line.

use super::ValueEntry;

const MARKER: &str = "- ";
const CONDITION_SEPARATOR: &str = "=>";

/// Parse a slot's raw definition into entries.
pub fn parse_entries(raw: &str) -> Vec<ValueEntry> {
    let has_markers = raw.lines().any(|line| marker_body(line).is_some());
    let mut bodies: Vec<String> = Vec::new();

    for line in raw.lines() {
        if let Some(body) = marker_body(line) {
            bodies.push(body.to_string());
            continue;
        }
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        match bodies.last_mut() {
            Some(last) if has_markers => {
                last.push('\n');
                last.push_str(line);
            }
            _ => bodies.push(line.to_string()),
        }
    }

    bodies.iter().map(|body| parse_line(body)).collect()
}

/// Parse one entry body (marker already stripped).
///
/// The first `=>` separates the condition; a value that itself contains `=>`
/// is therefore read as conditioned.
pub fn parse_line(body: &str) -> ValueEntry {
    let (condition, rest) = match body.split_once(CONDITION_SEPARATOR) {
        Some((condition, rest)) => (condition.trim().to_string(), rest),
        None => (String::new(), body),
    };

    match split_weight(rest) {
        Some((weight, value)) => ValueEntry::new(condition, Some(weight), value.trim()),
        None => ValueEntry::new(condition, None, rest.trim()),
    }
}

/// Serialize entries back into raw text.
pub fn serialize_entries(entries: &[ValueEntry]) -> String {
    entries.iter().map(serialize_entry).collect::<Vec<_>>().join("\n")
}

pub fn serialize_entry(entry: &ValueEntry) -> String {
    format!("{}{}", MARKER, serialize_body(entry))
}

/// One entry without its list marker, as stored in YAML sequences.
pub fn serialize_body(entry: &ValueEntry) -> String {
    let mut line = String::new();
    if !entry.condition.is_empty() {
        line.push_str(&entry.condition);
        line.push(' ');
        line.push_str(CONDITION_SEPARATOR);
        line.push(' ');
    }
    if let Some(weight) = entry.weight {
        line.push_str(&format!("{},", weight));
    }
    line.push_str(&entry.value);
    line
}

fn marker_body(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed == "-" {
        return Some("");
    }
    trimmed.strip_prefix(MARKER)
}

fn split_weight(rest: &str) -> Option<(f64, &str)> {
    let (head, value) = rest.split_once(',')?;
    let head = head.trim();
    if !is_decimal(head) {
        return None;
    }
    head.parse::<f64>().ok().map(|weight| (weight, value))
}

fn is_decimal(text: &str) -> bool {
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    match text.split_once('.') {
        Some((int, frac)) => digits(int) && digits(frac),
        None => digits(text),
    }
}
