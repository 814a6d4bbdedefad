use std::borrow::Borrow;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::validation::validate_slot_path;
use crate::domain::AppError;
use crate::impl_validated_path;

/// Prefix that marks slots owned by the prompt generator.
pub const MANAGED_PREFIX: &str = "m";

/// A validated slot key.
///
/// Guarantees:
/// - Non-empty
/// - `/`-separated segments, each containing only ASCII alphanumerics, `-`, or `_`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey(String);

impl_validated_path!(SlotKey, AppError::InvalidSlotKey);

impl SlotKey {
    /// Group path of the key, or `None` for keys in the root group.
    pub fn group(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(group, _)| group)
    }

    /// Last path segment.
    pub fn name(&self) -> &str {
        self.0.rsplit_once('/').map_or(self.0.as_str(), |(_, name)| name)
    }

    /// Whether the key sits in `group` or in a group nested beneath it.
    pub fn is_within(&self, group: &str) -> bool {
        self.0.len() > group.len() + 1
            && self.0.starts_with(group)
            && self.0.as_bytes()[group.len()] == b'/'
    }

    /// Same name placed under another group (`None` = root group).
    pub fn regroup(&self, group: Option<&str>) -> Result<SlotKey, AppError> {
        match group {
            Some(group) if !group.is_empty() => SlotKey::new(&format!("{}/{}", group, self.name())),
            _ => SlotKey::new(self.name()),
        }
    }

    /// Replace a leading group prefix, keeping whatever nests beneath it.
    pub fn rebase(&self, from_group: &str, to_group: &str) -> Result<SlotKey, AppError> {
        match self.0.strip_prefix(from_group).and_then(|rest| rest.strip_prefix('/')) {
            Some(rest) => SlotKey::new(&format!("{}/{}", to_group, rest)),
            None => Ok(self.clone()),
        }
    }

    /// Whether the key belongs to the generator-managed namespace.
    pub fn is_managed(&self) -> bool {
        self.is_within(MANAGED_PREFIX)
    }
}

/// Validate a group path supplied by a caller.
pub fn validate_group(group: &str) -> Result<(), AppError> {
    if validate_slot_path(group) {
        Ok(())
    } else {
        Err(AppError::Validation(format!("Invalid group name '{}'", group)))
    }
}

impl From<SlotKey> for String {
    fn from(val: SlotKey) -> Self {
        val.0
    }
}

impl Borrow<str> for SlotKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Serialize for SlotKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SlotKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SlotKey::new(&s).map_err(serde::de::Error::custom)
    }
}
