use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::similarity::find_similar_value;
use crate::domain::{AppError, SlotKey, SlotRegistry};

/// Key of the managed slot the generator expands.
pub const TEMPLATE_KEY: &str = "m/template";

/// Per-slot user choice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    Disabled,
    #[default]
    Random,
    Value(String),
}

impl Selection {
    /// Read the textual form used by widgets and the CLI.
    pub fn parse(text: &str) -> Self {
        match text {
            "disabled" => Selection::Disabled,
            "random" => Selection::Random,
            other => Selection::Value(other.to_string()),
        }
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            Selection::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Disabled => write!(f, "disabled"),
            Selection::Random => write!(f, "random"),
            Selection::Value(value) => write!(f, "{}", value),
        }
    }
}

impl Serialize for Selection {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Selection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Selection::parse(&s))
    }
}

/// Per-slot selections for one generator instance. Missing keys mean random.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionState {
    selections: BTreeMap<SlotKey, Selection>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every managed slot except `template_key`, set to random.
    pub fn for_managed(registry: &SlotRegistry, template_key: &str) -> Self {
        let selections = registry
            .managed_keys()
            .into_iter()
            .filter(|key| key.as_str() != template_key)
            .map(|key| (key.clone(), Selection::Random))
            .collect();
        Self { selections }
    }

    /// Parse `key=value` pairs as given on the command line.
    pub fn from_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self, AppError> {
        let mut state = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                AppError::validation(format!("Expected KEY=VALUE selection, got '{}'", pair))
            })?;
            state.set(SlotKey::new(key.trim())?, Selection::parse(value));
        }
        Ok(state)
    }

    pub fn get(&self, key: &str) -> Selection {
        self.selections.get(key).cloned().unwrap_or_default()
    }

    pub fn set(&mut self, key: SlotKey, selection: Selection) {
        self.selections.insert(key, selection);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, &Selection)> {
        self.selections.iter()
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn set_all_random(&mut self) {
        self.selections.values_mut().for_each(|selection| *selection = Selection::Random);
    }

    pub fn set_all_disabled(&mut self) {
        self.selections.values_mut().for_each(|selection| *selection = Selection::Disabled);
    }

    /// Turn the last random draws into explicit selections.
    pub fn pin_last_generated(&mut self, last_generated: &BTreeMap<SlotKey, String>) {
        for (key, value) in last_generated {
            self.selections.insert(key.clone(), Selection::Value(value.clone()));
        }
    }

    /// Re-validate explicit values against a refreshed registry.
    ///
    /// Keys that no longer exist are dropped; explicit values that vanished are
    /// replaced by their closest surviving value, or random.
    pub fn reconcile(&mut self, registry: &SlotRegistry) {
        self.selections.retain(|key, _| registry.contains(key));
        for (key, selection) in self.selections.iter_mut() {
            let Selection::Value(old) = selection else {
                continue;
            };
            let Some(slot) = registry.find(key) else {
                continue;
            };
            if !slot.contains_value(old) {
                *selection = find_similar_value(Some(old.as_str()), &slot.values());
            }
        }
    }
}
