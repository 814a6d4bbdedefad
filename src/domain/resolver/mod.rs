//! Expanding prompt templates into concrete text.
//!
//! References are resolved in template order. For each referenced slot the
//! caller's [`Selection`] decides whether it is skipped, pinned to an explicit
//! value, or drawn at random from the entries whose conditions hold. Drawn
//! values are expanded recursively up to [`ResolverOptions::max_depth`].

mod options;
mod rules;
mod template;
mod weights;

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::Serialize;

use crate::domain::condition::{ConditionContext, ConditionEvaluator, PatternConditions};
use crate::domain::identifiers::normalize_key;
use crate::domain::selection::TEMPLATE_KEY;
use crate::domain::slot::parse_line;
use crate::domain::{AppError, Selection, SelectionState, SlotKey, SlotRegistry, ValueEntry};
use crate::ports::Draw;

use options::{OptionCount, parse_option_group};
use rules::{count_header, prefix_rule};
pub use template::strip_comments;
use template::{Token, expand_quantifiers, tokenize};
pub use weights::{TOTAL_WEIGHT, effective_weights, pick_index};

/// Default nesting bound for slot expansion.
pub const DEFAULT_MAX_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    pub max_depth: usize,
    /// Slot expanded by [`Resolver::generate`].
    pub template_key: String,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH, template_key: TEMPLATE_KEY.to_string() }
    }
}

/// Non-fatal problems met while resolving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolveWarning {
    MissingSlot { key: String },
    NoEligibleValue { key: String },
    InvalidCondition { key: String, condition: String, reason: String },
}

impl fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveWarning::MissingSlot { key } => write!(f, "slot '{}' does not exist", key),
            ResolveWarning::NoEligibleValue { key } => {
                write!(f, "slot '{}' has no eligible value", key)
            }
            ResolveWarning::InvalidCondition { key, condition, reason } => {
                write!(f, "slot '{}': condition '{}' ignored: {}", key, condition, reason)
            }
        }
    }
}

/// Result of one resolution run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedPrompt {
    pub text: String,
    /// Value produced for each slot resolved during the run. When a slot is
    /// referenced more than once the first occurrence is kept.
    pub last_generated: BTreeMap<SlotKey, String>,
    pub warnings: Vec<ResolveWarning>,
}

/// Template expander over a registry snapshot.
#[derive(Debug, Clone)]
pub struct Resolver<'r, C = PatternConditions> {
    registry: &'r SlotRegistry,
    conditions: C,
    options: ResolverOptions,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r SlotRegistry) -> Self {
        Self { registry, conditions: PatternConditions, options: ResolverOptions::default() }
    }
}

impl<'r, C: ConditionEvaluator> Resolver<'r, C> {
    pub fn with_conditions<E: ConditionEvaluator>(self, conditions: E) -> Resolver<'r, E> {
        Resolver { registry: self.registry, conditions, options: self.options }
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Expand every placeholder in `template`. `#` comment lines are dropped first.
    pub fn resolve<D: Draw + ?Sized>(
        &self,
        template: &str,
        selection: &SelectionState,
        draw: &mut D,
    ) -> Result<ResolvedPrompt, AppError> {
        let template = strip_comments(template);
        let mut run = Run::new(self, selection, draw);
        let text = run.expand(&template, 0)?;
        Ok(run.finish(text))
    }

    /// Same as resolving the template `{key}`.
    pub fn resolve_slot<D: Draw + ?Sized>(
        &self,
        key: &str,
        selection: &SelectionState,
        draw: &mut D,
    ) -> Result<ResolvedPrompt, AppError> {
        let mut run = Run::new(self, selection, draw);
        let text = run.resolve_key(key, 0)?;
        Ok(run.finish(text))
    }

    /// Expand the managed template slot.
    pub fn generate<D: Draw + ?Sized>(
        &self,
        selection: &SelectionState,
        draw: &mut D,
    ) -> Result<ResolvedPrompt, AppError> {
        let key = &self.options.template_key;
        if !self.registry.contains(key) {
            return Err(AppError::NotFound(key.to_string()));
        }
        self.resolve_slot(key, selection, draw)
    }
}

/// Mutable state of a single resolution.
struct Run<'a, 'r, C, D: ?Sized> {
    resolver: &'a Resolver<'r, C>,
    selection: &'a SelectionState,
    draw: &'a mut D,
    resolved: Vec<(SlotKey, String)>,
    produced: String,
    last_generated: BTreeMap<SlotKey, String>,
    warnings: Vec<ResolveWarning>,
}

impl<'a, 'r, C: ConditionEvaluator, D: Draw + ?Sized> Run<'a, 'r, C, D> {
    fn new(resolver: &'a Resolver<'r, C>, selection: &'a SelectionState, draw: &'a mut D) -> Self {
        Self {
            resolver,
            selection,
            draw,
            resolved: Vec::new(),
            produced: String::new(),
            last_generated: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    fn finish(self, text: String) -> ResolvedPrompt {
        ResolvedPrompt { text, last_generated: self.last_generated, warnings: self.warnings }
    }

    fn expand(&mut self, text: &str, depth: usize) -> Result<String, AppError> {
        let text = expand_quantifiers(text);
        let mut out = String::new();
        for token in tokenize(&text) {
            match token {
                Token::Text(literal) => {
                    self.produced.push_str(literal);
                    out.push_str(literal);
                }
                Token::Reference(key) => out.push_str(&self.resolve_key(key, depth)?),
                Token::Wildcard(pattern) => out.push_str(&self.resolve_wildcard(pattern, depth)?),
                Token::Options(body) => out.push_str(&self.resolve_options(body, depth)?),
            }
        }
        Ok(out)
    }

    fn resolve_key(&mut self, key: &str, depth: usize) -> Result<String, AppError> {
        let registry = self.resolver.registry;
        let Some(slot) = registry.find(key) else {
            self.warnings.push(ResolveWarning::MissingSlot { key: key.to_string() });
            return Ok(String::new());
        };

        match self.selection.get(key) {
            Selection::Disabled => return Ok(String::new()),
            Selection::Value(value) if slot.contains_value(&value) => {
                self.record(&slot.key, &value);
                return Ok(value);
            }
            _ => {}
        }

        if depth >= self.resolver.options.max_depth {
            return Err(AppError::Recursion { key: key.to_string(), depth });
        }

        let entries: Vec<&ValueEntry> = slot.entries.iter().collect();
        let Some(chosen) = self.draw_entries(key, &entries) else {
            self.warnings.push(ResolveWarning::NoEligibleValue { key: key.to_string() });
            return Ok(String::new());
        };
        let text = self.expand_all(&chosen, depth + 1)?;
        self.record(&slot.key, &text);
        Ok(text)
    }

    /// `__name__` is `{name}` when the slot exists; otherwise the pattern is a
    /// glob (`*` = any run) matched against key prefixes, falling back to
    /// `*/name` for bare names. Glob draws pool every matching slot's entries
    /// and are not recorded in the last-generated map.
    fn resolve_wildcard(&mut self, pattern: &str, depth: usize) -> Result<String, AppError> {
        let registry = self.resolver.registry;
        if registry.contains(pattern) {
            return self.resolve_key(pattern, depth);
        }
        let normalized = normalize_key(pattern);
        if registry.contains(&normalized) {
            return self.resolve_key(&normalized, depth);
        }

        let glob = if normalized.contains('*') || normalized.contains('/') {
            normalized.clone()
        } else {
            format!("*/{}", normalized)
        };
        let matcher = glob_to_regex(&glob)?;
        let pooled: Vec<&ValueEntry> = registry
            .slots()
            .iter()
            .filter(|slot| {
                matcher.is_match(slot.key.as_str())
                    || matcher.is_match(&format!("{}/", slot.key.as_str()))
            })
            .flat_map(|slot| slot.entries.iter())
            .collect();
        if pooled.is_empty() {
            self.warnings.push(ResolveWarning::MissingSlot { key: pattern.to_string() });
            return Ok(String::new());
        }

        if depth >= self.resolver.options.max_depth {
            return Err(AppError::Recursion { key: pattern.to_string(), depth });
        }
        let Some(chosen) = self.draw_entries(pattern, &pooled) else {
            self.warnings.push(ResolveWarning::NoEligibleValue { key: pattern.to_string() });
            return Ok(String::new());
        };
        self.expand_all(&chosen, depth + 1)
    }

    fn resolve_options(&mut self, body: &str, depth: usize) -> Result<String, AppError> {
        if depth >= self.resolver.options.max_depth {
            return Err(AppError::Recursion { key: format!("{{{}}}", body), depth });
        }
        let group = parse_option_group(body);
        let mut pool: Vec<(f64, String)> =
            group.options.iter().map(|(weight, text)| (*weight, text.to_string())).collect();

        // `{2$$__colors__}` draws distinct values from a single slot.
        if group.count != OptionCount::One
            && let [(_, only)] = pool.as_slice()
            && let Some(slot) = single_slot_reference(only).and_then(|k| self.resolver.registry.find(k))
        {
            let values = slot.values();
            let skip = usize::from(values.first().is_some_and(|v| count_header(v).is_some()));
            pool = values.into_iter().skip(skip).map(|v| (1.0, v.to_string())).collect();
        }

        let count = match group.count {
            OptionCount::One => 1,
            OptionCount::Range(low, high) => self.draw_count(low, high, pool.len()),
        };

        let mut chosen = Vec::with_capacity(count);
        while chosen.len() < count && !pool.is_empty() {
            let weights: Vec<Option<f64>> = pool.iter().map(|(w, _)| Some(*w)).collect();
            let index = pick_index(&effective_weights(&weights), self.draw.percent());
            chosen.push(pool.remove(index).1);
        }

        let mut parts = Vec::with_capacity(chosen.len());
        for option in chosen {
            parts.push(self.expand(&option, depth + 1)?);
        }
        Ok(parts.join(group.separator))
    }

    /// Uniform count in `low..=high`, capped by what the pool can supply.
    fn draw_count(&mut self, low: usize, high: usize, available: usize) -> usize {
        let high = high.min(available);
        let low = low.min(high);
        if low == high { low } else { low + self.draw.index(high - low + 1) }
    }

    /// Weighted draw without repeats. One entry unless the first entry is an
    /// `A~B` header; `None` when nothing is eligible.
    fn draw_entries(&mut self, key: &str, entries: &[&ValueEntry]) -> Option<Vec<ValueEntry>> {
        let (bounds, body) = match entries.split_first() {
            Some((first, rest)) if first.is_unconditioned() && first.weight.is_none() => {
                match count_header(&first.value) {
                    Some(bounds) => (Some(bounds), rest),
                    None => (None, entries),
                }
            }
            _ => (None, entries),
        };

        let mut pool = self.eligible(key, body);
        if pool.is_empty() {
            return None;
        }
        let count = match bounds {
            Some((low, high)) => self.draw_count(low, high, pool.len()),
            None => 1,
        };

        let mut chosen = Vec::with_capacity(count);
        while chosen.len() < count && !pool.is_empty() {
            let weights: Vec<Option<f64>> = pool.iter().map(|entry| entry.weight).collect();
            let index = pick_index(&effective_weights(&weights), self.draw.percent());
            chosen.push(pool.remove(index));
        }
        Some(chosen)
    }

    /// Entries whose conditions hold, after prefix rules are applied.
    fn eligible(&mut self, key: &str, entries: &[&ValueEntry]) -> Vec<ValueEntry> {
        let ctx = ConditionContext::new(&self.resolved, &self.produced);
        let mut conditional = Vec::new();
        let mut always = Vec::with_capacity(entries.len());
        for entry in entries {
            if !entry.is_unconditioned() {
                match self.resolver.conditions.evaluate(&entry.condition, &ctx) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(err) => {
                        self.warnings.push(ResolveWarning::InvalidCondition {
                            key: key.to_string(),
                            condition: entry.condition.clone(),
                            reason: err.to_string(),
                        });
                        continue;
                    }
                }
            }

            let Some(rule) = prefix_rule(&entry.value) else {
                always.push((*entry).clone());
                continue;
            };
            match rule.keeps(&self.produced) {
                Ok(true) => {
                    let replacement = parse_line(rule.replacement);
                    let value = if replacement.condition.is_empty() {
                        replacement.value
                    } else {
                        rule.replacement.trim().to_string()
                    };
                    let derived = ValueEntry::new(
                        entry.condition.clone(),
                        replacement.weight.or(entry.weight),
                        value,
                    );
                    if rule.always { always.push(derived) } else { conditional.push(derived) }
                }
                Ok(false) => {}
                Err(err) => self.warnings.push(ResolveWarning::InvalidCondition {
                    key: key.to_string(),
                    condition: rule.pattern.to_string(),
                    reason: err.to_string(),
                }),
            }
        }
        if conditional.is_empty() { always } else { conditional }
    }

    /// Expand drawn entries and join them the way `A~B` slots emit.
    fn expand_all(&mut self, chosen: &[ValueEntry], depth: usize) -> Result<String, AppError> {
        let mut parts = Vec::with_capacity(chosen.len());
        for entry in chosen {
            parts.push(self.expand(&entry.value, depth)?);
        }
        Ok(parts.join(","))
    }

    fn record(&mut self, key: &SlotKey, value: &str) {
        self.resolved.push((key.clone(), value.to_string()));
        self.last_generated.entry(key.clone()).or_insert_with(|| value.to_string());
    }
}

/// Key named by an option that is exactly `__key__` or `{key}`.
fn single_slot_reference(option: &str) -> Option<&str> {
    match tokenize(option.trim()).as_slice() {
        [Token::Wildcard(key)] | [Token::Reference(key)] => Some(*key),
        _ => None,
    }
}

/// Translate a `*` glob into a regex anchored at the start of the key.
fn glob_to_regex(glob: &str) -> Result<Regex, AppError> {
    let body = glob.split('*').map(regex::escape).collect::<Vec<_>>().join(".*");
    Regex::new(&format!("^{}", body))
        .map_err(|e| AppError::validation(format!("Invalid wildcard '{}': {}", glob, e)))
}

/// Separator used when accumulating generated prompts.
pub const DEFAULT_SEPARATOR: &str = ", ";

/// Append `value` to an accumulated prompt, comma separated.
pub fn append_to_buffer(buffer: &str, value: &str) -> String {
    append_with_separator(buffer, value, DEFAULT_SEPARATOR)
}

/// Like [`append_to_buffer`] with a caller-chosen separator. A buffer holding
/// only whitespace starts over.
pub fn append_with_separator(buffer: &str, value: &str, separator: &str) -> String {
    if value.is_empty() {
        buffer.to_string()
    } else if buffer.trim().is_empty() {
        value.to_string()
    } else {
        format!("{}{}{}", buffer, separator, value)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::domain::{Slot, parse_entries};
    use crate::testing::{CountingDraw, FixedDraw};

    fn registry(slots: &[(&str, &str)]) -> SlotRegistry {
        let mut registry = SlotRegistry::new();
        for (key, raw) in slots {
            registry.put(key, raw).unwrap();
        }
        registry
    }

    fn colors() -> SlotRegistry {
        registry(&[("colors", "- red\n- blue\n- 50,green")])
    }

    #[test]
    fn draws_map_to_cumulative_ranges() {
        let registry = colors();
        let resolver = Resolver::new(&registry);
        let selection = SelectionState::new();

        for (draw, expected) in [(10.0, "red"), (30.0, "blue"), (80.0, "green")] {
            let out = resolver.resolve("{colors}", &selection, &mut FixedDraw::new([draw])).unwrap();
            assert_eq!(out.text, expected);
            assert_eq!(out.last_generated.get("colors").map(String::as_str), Some(expected));
            assert!(out.warnings.is_empty());
        }
    }

    #[test]
    fn conditions_see_earlier_choices() {
        let registry = registry(&[
            ("season", "- winter\n- summer"),
            ("coat", "- season=winter => wool coat\n- season=summer => linen shirt"),
        ]);
        let resolver = Resolver::new(&registry);
        let selection = SelectionState::from_pairs(&["season=winter"]).unwrap();

        let out =
            resolver.resolve("{season}, {coat}", &selection, &mut FixedDraw::new([0.0])).unwrap();
        assert_eq!(out.text, "winter, wool coat");
    }

    #[test]
    fn unmatched_conditions_yield_warning_and_empty_text() {
        let registry = registry(&[("coat", "- snow => wool coat")]);
        let out = Resolver::new(&registry)
            .resolve("[{coat}]", &SelectionState::new(), &mut FixedDraw::new([0.0]))
            .unwrap();
        assert_eq!(out.text, "[]");
        assert_eq!(out.warnings, vec![ResolveWarning::NoEligibleValue { key: "coat".into() }]);
        assert!(out.last_generated.is_empty());
    }

    #[test]
    fn bad_condition_is_reported_and_entry_skipped() {
        let key = SlotKey::new("coat").unwrap();
        let registry =
            SlotRegistry::from_slots([Slot::new(key, parse_entries("- ((( => odd\n- plain"))]);
        let out = Resolver::new(&registry)
            .resolve("{coat}", &SelectionState::new(), &mut FixedDraw::new([0.0]))
            .unwrap();
        assert_eq!(out.text, "plain");
        assert!(matches!(out.warnings[0], ResolveWarning::InvalidCondition { .. }));
    }

    #[test]
    fn explicit_value_needs_no_draw() {
        let registry = colors();
        let selection = SelectionState::from_pairs(&["colors=blue"]).unwrap();
        let mut draw = CountingDraw::default();
        let out = Resolver::new(&registry).resolve("{colors}", &selection, &mut draw).unwrap();
        assert_eq!(out.text, "blue");
        assert_eq!(draw.calls, 0);
        assert_eq!(out.last_generated.get("colors").map(String::as_str), Some("blue"));
    }

    #[test]
    fn stale_explicit_value_falls_back_to_random() {
        let registry = colors();
        let selection = SelectionState::from_pairs(&["colors=purple"]).unwrap();
        let out = Resolver::new(&registry)
            .resolve("{colors}", &selection, &mut FixedDraw::new([10.0]))
            .unwrap();
        assert_eq!(out.text, "red");
    }

    #[test]
    fn disabled_slot_contributes_nothing() {
        let registry = registry(&[("mood", "- grim"), ("colors", "- red")]);
        let selection = SelectionState::from_pairs(&["mood=disabled"]).unwrap();
        let out = Resolver::new(&registry)
            .resolve("{colors} {mood}", &selection, &mut FixedDraw::new([0.0]))
            .unwrap();
        assert_eq!(out.text, "red ");
        assert!(!out.last_generated.contains_key("mood"));
    }

    #[test]
    fn nested_references_expand() {
        let registry = registry(&[
            ("outfit", "- {colors} dress"),
            ("colors", "- red"),
        ]);
        let out = Resolver::new(&registry)
            .resolve("a {outfit}", &SelectionState::new(), &mut FixedDraw::new([0.0]))
            .unwrap();
        assert_eq!(out.text, "a red dress");
        assert_eq!(out.last_generated.get("outfit").map(String::as_str), Some("red dress"));
        assert_eq!(out.last_generated.get("colors").map(String::as_str), Some("red"));
    }

    #[test]
    fn cyclic_references_raise_recursion_error() {
        let registry = registry(&[("a", "- {b}"), ("b", "- {a}")]);
        let err = Resolver::new(&registry)
            .resolve("{a}", &SelectionState::new(), &mut FixedDraw::new([0.0]))
            .unwrap_err();
        assert!(matches!(err, AppError::Recursion { depth: DEFAULT_MAX_DEPTH, .. }));
    }

    #[test]
    fn custom_depth_bound() {
        let registry = registry(&[("a", "- {b}"), ("b", "- {c}"), ("c", "- end")]);
        let resolver =
            Resolver::new(&registry).with_options(ResolverOptions { max_depth: 2, ..Default::default() });
        let err = resolver
            .resolve("{a}", &SelectionState::new(), &mut FixedDraw::new([0.0]))
            .unwrap_err();
        assert!(matches!(err, AppError::Recursion { ref key, depth: 2 } if key == "c"));

        let resolver =
            Resolver::new(&registry).with_options(ResolverOptions { max_depth: 3, ..Default::default() });
        let out = resolver
            .resolve("{a}", &SelectionState::new(), &mut FixedDraw::new([0.0]))
            .unwrap();
        assert_eq!(out.text, "end");
    }

    #[test]
    fn missing_slot_warns() {
        let out = Resolver::new(&SlotRegistry::new())
            .resolve("x {nope} y", &SelectionState::new(), &mut FixedDraw::new([0.0]))
            .unwrap();
        assert_eq!(out.text, "x  y");
        assert_eq!(out.warnings, vec![ResolveWarning::MissingSlot { key: "nope".into() }]);
    }

    #[test]
    fn repeated_reference_keeps_first_value() {
        let registry = colors();
        let out = Resolver::new(&registry)
            .resolve("{colors} {colors}", &SelectionState::new(), &mut FixedDraw::new([10.0, 80.0]))
            .unwrap();
        assert_eq!(out.text, "red green");
        assert_eq!(out.last_generated.get("colors").map(String::as_str), Some("red"));
    }

    #[test]
    fn wildcards_resolve_keys_and_globs() {
        let registry = registry(&[
            ("m/hair", "- long"),
            ("palette/warm", "- red"),
            ("palette/cool", "- blue"),
        ]);
        let resolver = Resolver::new(&registry);
        let selection = SelectionState::new();

        let out = resolver.resolve("__m/hair__", &selection, &mut FixedDraw::new([0.0])).unwrap();
        assert_eq!(out.text, "long");

        let out = resolver.resolve("__hair__", &selection, &mut FixedDraw::new([0.0])).unwrap();
        assert_eq!(out.text, "long");

        let out =
            resolver.resolve("__palette/*__", &selection, &mut FixedDraw::new([99.0])).unwrap();
        assert_eq!(out.text, "blue");
        assert!(out.last_generated.is_empty());

        let out = resolver.resolve("__nothing__", &selection, &mut FixedDraw::new([0.0])).unwrap();
        assert_eq!(out.text, "");
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn inline_options_pick_weighted() {
        let registry = colors();
        let resolver = Resolver::new(&registry);
        let selection = SelectionState::new();

        let out = resolver.resolve("{cat|dog}", &selection, &mut FixedDraw::new([60.0])).unwrap();
        assert_eq!(out.text, "dog");

        let out =
            resolver.resolve("{3::cat|dog}", &selection, &mut FixedDraw::new([60.0])).unwrap();
        assert_eq!(out.text, "cat");

        let out = resolver
            .resolve("{big|{colors}}", &selection, &mut FixedDraw::new([90.0, 10.0]))
            .unwrap();
        assert_eq!(out.text, "red");
    }

    #[test]
    fn inline_options_select_several_without_repeats() {
        let registry = colors();
        let resolver = Resolver::new(&registry);
        let selection = SelectionState::new();

        let out =
            resolver.resolve("{2$$a|b|c}", &selection, &mut FixedDraw::new([0.0])).unwrap();
        assert_eq!(out.text, "a, b");

        let out = resolver
            .resolve("{1-3$$ & $$a|b|c}", &selection, &mut FixedDraw::new([99.0, 0.0]))
            .unwrap();
        assert_eq!(out.text, "a & c & b");

        let out = resolver
            .resolve("{3$$__colors__}", &selection, &mut FixedDraw::new([0.0]))
            .unwrap();
        assert_eq!(out.text, "red, blue, green");
    }

    #[test]
    fn option_count_is_capped_by_the_pool() {
        let registry = SlotRegistry::new();
        let resolver = Resolver::new(&registry);
        let selection = SelectionState::new();

        let out = resolver
            .resolve("{0-18446744073709551615$$a|b}", &selection, &mut FixedDraw::new([99.0, 0.0]))
            .unwrap();
        assert_eq!(out.text, "a, b");

        let out = resolver
            .resolve("{5-9$$a|b|c}", &selection, &mut FixedDraw::new([0.0]))
            .unwrap();
        assert_eq!(out.text, "a, b, c");
    }

    #[test]
    fn nested_option_groups_stop_at_depth_bound() {
        let template = format!("{}x{}", "{a|".repeat(200), "}".repeat(200));
        let err = Resolver::new(&SlotRegistry::new())
            .resolve(&template, &SelectionState::new(), &mut FixedDraw::new([99.0]))
            .unwrap_err();
        assert!(matches!(err, AppError::Recursion { depth: DEFAULT_MAX_DEPTH, .. }));

        let shallow = format!("{}x{}", "{a|".repeat(3), "}".repeat(3));
        let out = Resolver::new(&SlotRegistry::new())
            .resolve(&shallow, &SelectionState::new(), &mut FixedDraw::new([99.0]))
            .unwrap();
        assert_eq!(out.text, "x");
    }

    #[test]
    fn count_header_draws_distinct_values() {
        let reg = registry(&[("tags", "- 2~3\n- red\n- blue\n- green")]);
        let resolver = Resolver::new(&reg);
        let selection = SelectionState::new();

        let out = resolver.resolve("{tags}", &selection, &mut FixedDraw::new([0.0])).unwrap();
        assert_eq!(out.text, "red,blue");
        assert_eq!(out.last_generated.get("tags").map(String::as_str), Some("red,blue"));

        let out = resolver
            .resolve("{tags}", &selection, &mut FixedDraw::new([99.0, 0.0, 0.0, 0.0]))
            .unwrap();
        assert_eq!(out.text, "red,blue,green");

        let none = registry(&[("tags", "- 0~0\n- red")]);
        let out = Resolver::new(&none)
            .resolve("[{tags}]", &selection, &mut FixedDraw::new([0.0]))
            .unwrap();
        assert_eq!(out.text, "[]");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn count_header_applies_to_glob_pools() {
        let registry = registry(&[("pal/warm", "- 3~3\n- red\n- orange"), ("pal/cool", "- blue")]);
        let out = Resolver::new(&registry)
            .resolve("__pal/*__", &SelectionState::new(), &mut FixedDraw::new([0.0]))
            .unwrap();
        assert_eq!(out.text, "red,orange,blue");
    }

    #[test]
    fn prefix_rules_follow_preceding_text() {
        let registry = registry(&[("tone", "- /red/warm\n- /!red/cool\n- neutral")]);
        let resolver = Resolver::new(&registry);
        let selection = SelectionState::new();

        let out = resolver.resolve("Red hat, {tone}", &selection, &mut FixedDraw::new([0.0])).unwrap();
        assert_eq!(out.text, "Red hat, warm");

        let out = resolver.resolve("blue hat, {tone}", &selection, &mut FixedDraw::new([0.0])).unwrap();
        assert_eq!(out.text, "blue hat, cool");
    }

    #[test]
    fn always_rules_join_plain_entries_when_nothing_conditional_holds() {
        let registry = registry(&[("tone", "- /gold/shiny\n- +/red/warm\n- -/red/plain\n- dull")]);
        let resolver = Resolver::new(&registry);
        let selection = SelectionState::new();

        let out = resolver.resolve("red {tone}", &selection, &mut FixedDraw::new([0.0])).unwrap();
        assert_eq!(out.text, "red warm");
        let out = resolver.resolve("red {tone}", &selection, &mut FixedDraw::new([99.0])).unwrap();
        assert_eq!(out.text, "red dull");

        let out = resolver.resolve("blue {tone}", &selection, &mut FixedDraw::new([0.0])).unwrap();
        assert_eq!(out.text, "blue plain");

        let out = resolver.resolve("gold {tone}", &selection, &mut FixedDraw::new([99.0])).unwrap();
        assert_eq!(out.text, "gold shiny");
    }

    #[test]
    fn prefix_rule_replacement_can_carry_weight() {
        let registry = registry(&[("tone", "- /x/90,hot\n- /x/cold")]);
        let out = Resolver::new(&registry)
            .resolve("x {tone}", &SelectionState::new(), &mut FixedDraw::new([50.0]))
            .unwrap();
        assert_eq!(out.text, "x hot");
    }

    #[test]
    fn broken_prefix_rule_warns_and_is_skipped() {
        let registry = registry(&[("tone", "- /(/odd\n- plain")]);
        let out = Resolver::new(&registry)
            .resolve("{tone}", &SelectionState::new(), &mut FixedDraw::new([0.0]))
            .unwrap();
        assert_eq!(out.text, "plain");
        assert!(matches!(
            &out.warnings[..],
            [ResolveWarning::InvalidCondition { key, .. }] if key == "tone"
        ));
    }

    #[test]
    fn quantified_wildcards_repeat_the_draw() {
        let registry = colors();
        let out = Resolver::new(&registry)
            .resolve("{2$$ $$3#__colors__}", &SelectionState::new(), &mut FixedDraw::new([10.0]))
            .unwrap();
        assert_eq!(out.text, "red red");

        let out = Resolver::new(&registry)
            .resolve("2#__colors__", &SelectionState::new(), &mut FixedDraw::new([10.0]))
            .unwrap();
        assert_eq!(out.text, "red|red");
    }

    #[test]
    fn comments_are_stripped_before_expansion() {
        let registry = colors();
        let out = Resolver::new(&registry)
            .resolve("# {colors}\nplain", &SelectionState::new(), &mut CountingDraw::default())
            .unwrap();
        assert_eq!(out.text, "plain");
    }

    #[test]
    fn resolve_slot_matches_braced_template() {
        let registry = colors();
        let resolver = Resolver::new(&registry);
        let selection = SelectionState::new();
        let direct = resolver.resolve_slot("colors", &selection, &mut FixedDraw::new([30.0])).unwrap();
        let braced = resolver.resolve("{colors}", &selection, &mut FixedDraw::new([30.0])).unwrap();
        assert_eq!(direct, braced);
    }

    #[test]
    fn generate_expands_managed_template() {
        let registry = registry(&[
            ("m/hair", "- long\n- short"),
            ("m/template", "- 1girl, {m/hair} hair"),
        ]);
        let resolver = Resolver::new(&registry);
        let selection = SelectionState::from_pairs(&["m/hair=short"]).unwrap();
        let out = resolver.generate(&selection, &mut FixedDraw::new([0.0])).unwrap();
        assert_eq!(out.text, "1girl, short hair");

        let empty = SlotRegistry::new();
        let err = Resolver::new(&empty)
            .generate(&SelectionState::new(), &mut FixedDraw::new([0.0]))
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn custom_condition_evaluator() {
        struct Never;
        impl ConditionEvaluator for Never {
            fn evaluate(&self, _: &str, _: &ConditionContext<'_>) -> Result<bool, AppError> {
                Ok(false)
            }
        }
        let registry = registry(&[("coat", "- x => wool\n- plain")]);
        let out = Resolver::new(&registry)
            .with_conditions(Never)
            .resolve("{coat}", &SelectionState::new(), &mut FixedDraw::new([0.0]))
            .unwrap();
        assert_eq!(out.text, "plain");
    }

    #[test]
    fn buffer_accumulates_with_commas() {
        assert_eq!(append_to_buffer("", "a"), "a");
        assert_eq!(append_to_buffer("a", "b"), "a, b");
        assert_eq!(append_to_buffer("a", ""), "a");
        assert_eq!(append_to_buffer("  ", "b"), "b");
        assert_eq!(append_with_separator("a", "b", " BREAK "), "a BREAK b");
    }

    proptest! {
        #[test]
        fn explicit_selection_is_verbatim(pick in 0usize..3, draws in prop::collection::vec(0.0f64..100.0, 1..4)) {
            let registry = colors();
            let value = ["red", "blue", "green"][pick];
            let selection = SelectionState::from_pairs(&[format!("colors={}", value)]).unwrap();
            let out = Resolver::new(&registry)
                .resolve("<{colors}>", &selection, &mut FixedDraw::new(draws))
                .unwrap();
            prop_assert_eq!(out.text, format!("<{}>", value));
        }

        #[test]
        fn random_choice_is_always_a_slot_value(draw in 0.0f64..100.0) {
            let registry = colors();
            let out = Resolver::new(&registry)
                .resolve("{colors}", &SelectionState::new(), &mut FixedDraw::new([draw]))
                .unwrap();
            prop_assert!(["red", "blue", "green"].contains(&out.text.as_str()));
        }
    }
}
