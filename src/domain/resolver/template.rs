//! Tokenizing prompt templates.
//!
//! A template is literal text interleaved with three kinds of placeholder:
//! `{key}` references, `__pattern__` wildcards, and `{a|b|c}` inline option
//! groups. A brace group whose body is a valid slot key is a reference; any
//! other brace group is an option group.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::domain::identifiers::validation::validate_slot_path;

static WILDCARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^__([\w.\-+/*\\]+)__").expect("wildcard pattern must compile")
});

static QUANTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+)#__([\w.\-+/*\\]+)__").expect("quantifier pattern must compile")
});

/// Upper bound on the repeat count of `N#__key__`.
pub const MAX_QUANTIFIER: usize = 100;

/// Rewrite `N#__key__` as `N` wildcards joined by `|`.
pub fn expand_quantifiers(text: &str) -> Cow<'_, str> {
    QUANTIFIER.replace_all(text, |caps: &Captures<'_>| {
        let count = caps[1].parse::<usize>().map_or(MAX_QUANTIFIER, |n| n.min(MAX_QUANTIFIER));
        vec![format!("__{}__", &caps[2]); count].join("|")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'t> {
    Text(&'t str),
    Reference(&'t str),
    Wildcard(&'t str),
    Options(&'t str),
}

/// Split `text` into literal runs and placeholders, in template order.
///
/// Unbalanced braces are kept as literal text.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        let placeholder = if rest.starts_with('{') {
            matching_brace(rest).map(|end| {
                let body = &rest[1..end];
                let token = if validate_slot_path(body) {
                    Token::Reference(body)
                } else {
                    Token::Options(body)
                };
                (token, end + 1)
            })
        } else if rest.starts_with("__") {
            WILDCARD.captures(rest).and_then(|caps| {
                let whole = caps.get(0)?;
                let pattern = caps.get(1)?;
                Some((Token::Wildcard(pattern.as_str()), whole.end()))
            })
        } else {
            None
        };

        match placeholder {
            Some((token, consumed)) => {
                if text_start < pos {
                    tokens.push(Token::Text(&text[text_start..pos]));
                }
                tokens.push(token);
                pos += consumed;
                text_start = pos;
            }
            None => {
                pos += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    if text_start < text.len() {
        tokens.push(Token::Text(&text[text_start..]));
    }
    tokens
}

/// Byte offset of the `}` closing the `{` at the start of `text`.
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (index, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on `separator` where it is not nested inside braces.
pub fn split_top_level<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        if depth == 0 && rest.starts_with(separator) {
            parts.push(&text[start..pos]);
            pos += separator.len();
            start = pos;
            continue;
        }
        match rest.chars().next() {
            Some('{') => depth += 1,
            Some('}') => depth = depth.saturating_sub(1),
            _ => {}
        }
        pos += rest.chars().next().map_or(1, char::len_utf8);
    }
    parts.push(&text[start..]);
    parts
}

/// Drop `#` comment lines; the line after a comment joins the previous line.
pub fn strip_comments(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut joining = false;

    for line in text.lines() {
        if line.trim_start().starts_with('#') {
            joining = true;
            continue;
        }
        match lines.last_mut() {
            Some(last) if joining => {
                last.push(' ');
                last.push_str(line);
            }
            _ => lines.push(line.to_string()),
        }
        joining = false;
    }
    lines.join("\n")
}
