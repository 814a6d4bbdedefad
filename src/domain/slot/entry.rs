use serde::Serialize;

use crate::domain::SlotKey;

/// One candidate value of a slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueEntry {
    /// Eligibility condition; empty means always eligible.
    pub condition: String,
    /// Explicit weight in percentage points; `None` shares the remaining mass.
    pub weight: Option<f64>,
    /// Literal text, possibly containing references to other slots.
    pub value: String,
}

impl ValueEntry {
    pub fn new(condition: impl Into<String>, weight: Option<f64>, value: impl Into<String>) -> Self {
        Self { condition: condition.into(), weight, value: value.into() }
    }

    /// Unconditioned, auto-weighted entry.
    pub fn plain(value: impl Into<String>) -> Self {
        Self::new(String::new(), None, value)
    }

    pub fn is_unconditioned(&self) -> bool {
        self.condition.trim().is_empty()
    }
}

/// A named, ordered list of candidate values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    pub key: SlotKey,
    pub entries: Vec<ValueEntry>,
}

impl Slot {
    pub fn new(key: SlotKey, entries: Vec<ValueEntry>) -> Self {
        Self { key, entries }
    }

    /// Literal values in definition order.
    pub fn values(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.value.as_str()).collect()
    }

    pub fn contains_value(&self, value: &str) -> bool {
        self.entries.iter().any(|entry| entry.value == value)
    }

    /// Sum of the explicit weights declared on the slot.
    pub fn explicit_weight_sum(&self) -> f64 {
        self.entries.iter().filter_map(|entry| entry.weight).sum()
    }
}
