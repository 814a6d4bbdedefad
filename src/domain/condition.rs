//! Entry eligibility conditions.
//!
//! Grammar:
//!
//! ```text
//! expr := and ('|' and)*
//! and  := not ('&' not)*
//! not  := '~'? term
//! term := '(' expr ')' | atom
//! atom := [slot_key '='] regex        (any text except | & ~ ( ))
//! ```
//!
//! `slot_key=regex` tests the value already resolved for that slot; a bare
//! regex searches the text produced so far and every resolved value. Regexes
//! are case-insensitive. Parentheses nest at most [`MAX_NESTING`] deep.

use regex::{Regex, RegexBuilder};

use crate::domain::identifiers::validation::validate_slot_path;
use crate::domain::{AppError, SlotKey};

/// Deepest parenthesis nesting accepted by the parser.
pub const MAX_NESTING: usize = 64;

/// What a condition can observe while a prompt is being resolved.
#[derive(Debug, Clone, Copy)]
pub struct ConditionContext<'a> {
    /// Slot choices made so far, in resolution order.
    pub resolved: &'a [(SlotKey, String)],
    /// Output text produced before the reference being resolved.
    pub produced: &'a str,
}

impl<'a> ConditionContext<'a> {
    pub fn new(resolved: &'a [(SlotKey, String)], produced: &'a str) -> Self {
        Self { resolved, produced }
    }

    /// Most recent value resolved for `key`.
    pub fn value_of(&self, key: &str) -> Option<&'a str> {
        self.resolved.iter().rev().find(|(k, _)| k.as_str() == key).map(|(_, v)| v.as_str())
    }
}

/// Extension point deciding whether a conditioned entry is eligible.
pub trait ConditionEvaluator {
    fn evaluate(&self, condition: &str, ctx: &ConditionContext<'_>) -> Result<bool, AppError>;
}

/// Evaluator for the boolean pattern grammar described in the module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternConditions;

impl ConditionEvaluator for PatternConditions {
    fn evaluate(&self, condition: &str, ctx: &ConditionContext<'_>) -> Result<bool, AppError> {
        if condition.trim().is_empty() {
            return Ok(true);
        }
        Ok(Condition::parse(condition)?.matches(ctx))
    }
}

/// Parsed condition tree.
#[derive(Debug, Clone)]
pub enum Condition {
    Term { slot: Option<String>, pattern: Regex },
    Not(Box<Condition>),
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    pub fn parse(source: &str) -> Result<Condition, AppError> {
        let mut parser = Parser { source, chars: source.chars().collect(), pos: 0, depth: 0 };
        let condition = parser.parse_expr()?;
        parser.skip_whitespace();
        if let Some(c) = parser.peek() {
            return Err(parser.error(format!("unexpected '{}' at position {}", c, parser.pos)));
        }
        Ok(condition)
    }

    pub fn matches(&self, ctx: &ConditionContext<'_>) -> bool {
        match self {
            Condition::Term { slot: Some(slot), pattern } => {
                ctx.value_of(slot).is_some_and(|value| pattern.is_match(value))
            }
            Condition::Term { slot: None, pattern } => {
                pattern.is_match(ctx.produced)
                    || ctx.resolved.iter().any(|(_, value)| pattern.is_match(value))
            }
            Condition::Not(inner) => !inner.matches(ctx),
            Condition::All(terms) => terms.iter().all(|term| term.matches(ctx)),
            Condition::Any(terms) => terms.iter().any(|term| term.matches(ctx)),
        }
    }
}

/// Check a condition's syntax without evaluating it.
pub fn validate_condition(condition: &str) -> Result<(), AppError> {
    if condition.trim().is_empty() {
        return Ok(());
    }
    Condition::parse(condition).map(|_| ())
}

struct Parser<'s> {
    source: &'s str,
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn error(&self, reason: String) -> AppError {
        AppError::InvalidCondition { condition: self.source.to_string(), reason }
    }

    fn parse_expr(&mut self) -> Result<Condition, AppError> {
        let mut terms = vec![self.parse_and()?];
        self.skip_whitespace();
        while self.peek() == Some('|') {
            self.pos += 1;
            terms.push(self.parse_and()?);
            self.skip_whitespace();
        }
        Ok(if terms.len() == 1 { terms.remove(0) } else { Condition::Any(terms) })
    }

    fn parse_and(&mut self) -> Result<Condition, AppError> {
        let mut terms = vec![self.parse_not()?];
        self.skip_whitespace();
        while self.peek() == Some('&') {
            self.pos += 1;
            terms.push(self.parse_not()?);
            self.skip_whitespace();
        }
        Ok(if terms.len() == 1 { terms.remove(0) } else { Condition::All(terms) })
    }

    fn parse_not(&mut self) -> Result<Condition, AppError> {
        self.skip_whitespace();
        if self.peek() == Some('~') {
            self.pos += 1;
            let term = self.parse_term()?;
            return Ok(Condition::Not(Box::new(term)));
        }
        self.parse_term()
    }

    fn parse_term(&mut self) -> Result<Condition, AppError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error("unexpected end of condition".to_string())),
            Some('(') => {
                if self.depth >= MAX_NESTING {
                    return Err(self.error(format!(
                        "parentheses nested deeper than {} at position {}",
                        MAX_NESTING, self.pos
                    )));
                }
                self.pos += 1;
                self.depth += 1;
                let inner = self.parse_expr()?;
                self.depth -= 1;
                self.skip_whitespace();
                if self.peek() != Some(')') {
                    return Err(self.error(format!("expected ')' at position {}", self.pos)));
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(_) => self.parse_atom(),
        }
    }

    fn parse_atom(&mut self) -> Result<Condition, AppError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| !"|&~()".contains(c)) {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        let text = text.trim();
        if text.is_empty() {
            return Err(self.error(format!("expected pattern at position {}", start)));
        }

        let (slot, pattern) = match text.split_once('=') {
            Some((slot, pattern)) if validate_slot_path(slot.trim()) => {
                (Some(slot.trim().to_string()), pattern.trim())
            }
            _ => (None, text),
        };
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|err| self.error(err.to_string()))?;
        Ok(Condition::Term { slot, pattern })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> SlotKey {
        SlotKey::new(s).unwrap()
    }

    fn eval(condition: &str, resolved: &[(SlotKey, String)], produced: &str) -> bool {
        PatternConditions.evaluate(condition, &ConditionContext::new(resolved, produced)).unwrap()
    }

    #[test]
    fn empty_condition_is_always_true() {
        assert!(eval("", &[], ""));
        assert!(eval("   ", &[], ""));
    }

    #[test]
    fn keyed_term_checks_that_slot_only() {
        let resolved = vec![(key("season"), "Winter".to_string()), (key("mood"), "warm".to_string())];
        assert!(eval("season=winter", &resolved, ""));
        assert!(!eval("season=warm", &resolved, ""));
        assert!(!eval("weather=winter", &resolved, ""));
    }

    #[test]
    fn bare_term_searches_output_and_values() {
        let resolved = vec![(key("season"), "winter".to_string())];
        assert!(eval("winter", &resolved, ""));
        assert!(eval("portrait", &resolved, "a portrait of"));
        assert!(!eval("summer", &resolved, "a portrait of"));
    }

    #[test]
    fn boolean_operators_and_grouping() {
        let resolved = vec![(key("season"), "winter".to_string()), (key("time"), "night".to_string())];
        assert!(eval("season=winter & time=night", &resolved, ""));
        assert!(eval("season=summer | time=night", &resolved, ""));
        assert!(!eval("~season=winter", &resolved, ""));
        assert!(eval("(season=summer | season=winter) & ~time=day", &resolved, ""));
    }

    #[test]
    fn regex_terms_are_supported() {
        let resolved = vec![(key("hair"), "long blonde".to_string())];
        assert!(eval("hair=^long", &resolved, ""));
        assert!(!eval("hair=^blonde", &resolved, ""));
    }

    #[test]
    fn malformed_conditions_are_rejected() {
        assert!(matches!(validate_condition("(a | b"), Err(AppError::InvalidCondition { .. })));
        assert!(validate_condition("a &").is_err());
        assert!(validate_condition("a)").is_err());
        assert!(validate_condition("x=[").is_err());
        assert!(validate_condition("warm").is_ok());
    }

    #[test]
    fn nesting_is_bounded() {
        let deep = format!("{}a{}", "(".repeat(200_000), ")".repeat(200_000));
        assert!(matches!(
            validate_condition(&deep),
            Err(AppError::InvalidCondition { ref reason, .. }) if reason.contains("nested")
        ));

        let ok = format!("{}a{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert!(validate_condition(&ok).is_ok());
    }

    #[test]
    fn long_operator_chains_evaluate() {
        let resolved = vec![(key("season"), "winter".to_string())];
        let chain = vec!["season=summer"; 5_000].join(" | ") + " | season=winter";
        assert!(eval(&chain, &resolved, ""));
        let all = vec!["winter"; 5_000].join(" & ");
        assert!(eval(&all, &resolved, ""));
    }
}
