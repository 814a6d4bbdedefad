//! Inline option groups: `{a|b}`, `{2::a|b}`, `{2$$a|b|c}`, `{1-3$$, $$a|b|c}`.

use super::template::split_top_level;

/// How many options an inline group emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionCount {
    One,
    /// Inclusive bounds; the actual count is drawn uniformly.
    Range(usize, usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionGroup<'b> {
    /// Relative weight and raw text of each option.
    pub options: Vec<(f64, &'b str)>,
    pub count: OptionCount,
    pub separator: &'b str,
}

const DEFAULT_SEPARATOR: &str = ", ";

/// Parse the body of a `{...}` option group.
pub fn parse_option_group(body: &str) -> OptionGroup<'_> {
    let parts = split_top_level(body, "$$");
    let (count, separator, options_text) = match parts.as_slice() {
        [count, options] => match parse_count(count) {
            Some(count) => (count, DEFAULT_SEPARATOR, *options),
            None => (OptionCount::One, DEFAULT_SEPARATOR, body),
        },
        [count, separator, options] => match parse_count(count) {
            Some(count) => (count, *separator, *options),
            None => (OptionCount::One, DEFAULT_SEPARATOR, body),
        },
        _ => (OptionCount::One, DEFAULT_SEPARATOR, body),
    };

    let options = split_top_level(options_text, "|").into_iter().map(parse_option).collect();
    OptionGroup { options, count, separator }
}

fn parse_option(option: &str) -> (f64, &str) {
    if let Some((weight, text)) = option.split_once("::")
        && let Ok(weight) = weight.trim().parse::<f64>()
    {
        return (weight.max(0.0), text);
    }
    (1.0, option)
}

/// `K`, `J-K`, or `-K` (meaning `1-K`).
fn parse_count(text: &str) -> Option<OptionCount> {
    let text = text.trim();
    let (low, high): (usize, usize) = match text.split_once('-') {
        Some(("", high)) => (1, high.trim().parse().ok()?),
        Some((low, high)) => (low.trim().parse().ok()?, high.trim().parse().ok()?),
        None => {
            let exact = text.parse().ok()?;
            (exact, exact)
        }
    };
    Some(OptionCount::Range(low.min(high), low.max(high)))
}
