//! Per-entry draw rules carried over from plain wildcard files.
//!
//! - A first line `A~B` makes the slot emit between `A` and `B` distinct
//!   values, joined by `,`.
//! - Entries shaped `/re/text` depend on the text produced before the slot:
//!
//! | form          | kept when `re` ... | pool        |
//! |---------------|--------------------|-------------|
//! | `/re/text`    | matches            | conditional |
//! | `/!re/text`   | does not match     | conditional |
//! | `+/re/text`   | matches            | always      |
//! | `+/!re/text`  | does not match     | always      |
//! | `-/re/text`   | does not match     | always      |
//!
//! When any conditional entry is kept, the draw uses only those; otherwise it
//! uses the always pool (which also holds every plain entry).

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

static COUNT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *([0-9]+)~([0-9]+) *$").expect("count header pattern must compile")
});

/// Inclusive bounds of an `A~B` header line, smaller bound first.
pub fn count_header(value: &str) -> Option<(usize, usize)> {
    let caps = COUNT_HEADER.captures(value)?;
    let low: usize = caps[1].parse().ok()?;
    let high: usize = caps[2].parse().ok()?;
    Some((low.min(high), low.max(high)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixRule<'v> {
    pub pattern: &'v str,
    /// Keep the entry when the pattern does NOT match.
    pub negate: bool,
    /// Belongs to the always pool instead of the conditional one.
    pub always: bool,
    pub replacement: &'v str,
}

impl PrefixRule<'_> {
    /// Case-insensitive test against the text produced so far.
    pub fn keeps(&self, produced: &str) -> Result<bool, regex::Error> {
        let regex = RegexBuilder::new(self.pattern).case_insensitive(true).build()?;
        Ok(regex.is_match(produced) != self.negate)
    }
}

/// Read an entry value as a prefix rule. Values without a second `/` are plain.
pub fn prefix_rule(value: &str) -> Option<PrefixRule<'_>> {
    let (body, negate, always) = if let Some(body) = value.strip_prefix("+/!") {
        (body, true, true)
    } else if let Some(body) = value.strip_prefix("+/") {
        (body, false, true)
    } else if let Some(body) = value.strip_prefix("-/") {
        (body, true, true)
    } else if let Some(body) = value.strip_prefix("/!") {
        (body, true, false)
    } else if let Some(body) = value.strip_prefix('/') {
        (body, false, false)
    } else {
        return None;
    };
    let (pattern, replacement) = body.split_once('/')?;
    Some(PrefixRule { pattern, negate, always, replacement })
}
