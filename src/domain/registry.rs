//! Ordered dictionary of slot definitions.
//!
//! Order is insertion/persisted order and is significant for display and for
//! group reordering. Groups are implicit: a slot belongs to the group formed by
//! its key's leading path segments.

use crate::domain::condition::validate_condition;
use crate::domain::identifiers::validate_group;
use crate::domain::slot::{Slot, ValueEntry, parse_entries, serialize_entries};
use crate::domain::{AppError, SlotKey};

/// Where `move_slot` places a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveTarget {
    /// Append at the end of a group (`None` = root group).
    Group(Option<String>),
    /// Insert before an existing slot, adopting its group.
    Before(SlotKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMode {
    Move,
    Copy,
}

/// Result of a move request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The slot now lives at `key`.
    Moved { key: SlotKey },
    /// `key` is already taken; nothing changed. Retry with `force` to replace it.
    Conflict { key: SlotKey },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupPosition {
    Before,
    End,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotRegistry {
    slots: Vec<Slot>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from already-parsed slots; later duplicates replace earlier ones.
    pub fn from_slots(slots: impl IntoIterator<Item = Slot>) -> Self {
        let mut registry = Self::new();
        for slot in slots {
            registry.insert(slot);
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Result<&Slot, AppError> {
        self.find(key).ok_or_else(|| AppError::NotFound(key.to_string()))
    }

    /// Non-failing lookup used during resolution.
    pub fn find(&self, key: &str) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.key.as_str() == key)
    }

    /// Literal values of a slot in definition order.
    pub fn values(&self, key: &str) -> Result<Vec<&str>, AppError> {
        self.get(key).map(Slot::values)
    }

    /// Serialized raw text of a slot.
    pub fn raw_text(&self, key: &str) -> Result<String, AppError> {
        self.get(key).map(|slot| serialize_entries(&slot.entries))
    }

    /// Keys in registry order, optionally restricted to a group and its nested groups.
    pub fn list_keys(&self, prefix: Option<&str>) -> Vec<&SlotKey> {
        self.slots
            .iter()
            .map(|slot| &slot.key)
            .filter(|key| prefix.is_none_or(|group| key.is_within(group)))
            .collect()
    }

    /// Distinct groups in order of first appearance; `""` is the root group.
    pub fn list_groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for slot in &self.slots {
            let group = slot.key.group().unwrap_or("");
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
        groups
    }

    /// Keys of generator-managed slots.
    pub fn managed_keys(&self) -> Vec<&SlotKey> {
        self.slots.iter().map(|slot| &slot.key).filter(|key| key.is_managed()).collect()
    }

    /// Parse `raw_text` and create or replace the slot at `key`.
    pub fn put(&mut self, key: &str, raw_text: &str) -> Result<&Slot, AppError> {
        let key = SlotKey::new(key)?;
        let entries = parse_entries(raw_text);
        validate_entries(&key, &entries)?;
        Ok(self.insert(Slot::new(key, entries)))
    }

    pub fn rename(&mut self, old_key: &str, new_key: &str) -> Result<SlotKey, AppError> {
        let new_key = SlotKey::new(new_key)?;
        let index = self.index_of(old_key)?;
        if old_key == new_key.as_str() {
            return Ok(new_key);
        }
        if self.contains(&new_key) {
            return Err(AppError::Conflict { key: new_key.to_string() });
        }
        self.slots[index].key = new_key.clone();
        Ok(new_key)
    }

    pub fn delete(&mut self, key: &str) -> Result<Slot, AppError> {
        let index = self.index_of(key)?;
        Ok(self.slots.remove(index))
    }

    /// Relocate (or copy) a slot into another group or before another slot.
    pub fn move_slot(
        &mut self,
        from_key: &str,
        target: &MoveTarget,
        mode: MoveMode,
        force: bool,
    ) -> Result<MoveOutcome, AppError> {
        let source_index = self.index_of(from_key)?;
        let source = self.slots[source_index].clone();

        if let MoveTarget::Before(anchor) = target
            && anchor.as_str() == from_key
            && mode == MoveMode::Move
        {
            return Ok(MoveOutcome::Moved { key: source.key });
        }

        let destination = match target {
            MoveTarget::Group(group) => {
                if let Some(group) = group.as_deref() {
                    validate_group(group)?;
                }
                source.key.regroup(group.as_deref())?
            }
            MoveTarget::Before(anchor) => {
                self.index_of(anchor)?;
                source.key.regroup(anchor.group())?
            }
        };

        if let Some(existing) = self.position(&destination)
            && (existing != source_index || mode == MoveMode::Copy)
        {
            if !force {
                return Ok(MoveOutcome::Conflict { key: destination });
            }
            if existing == source_index {
                return Err(AppError::validation(format!("Cannot copy '{}' onto itself", from_key)));
            }
            if let MoveTarget::Before(anchor) = target
                && anchor == &destination
            {
                return Err(AppError::validation(format!(
                    "Cannot replace '{}' while using it as the drop position",
                    destination
                )));
            }
            self.slots.remove(existing);
        }

        if mode == MoveMode::Move {
            self.remove_key(from_key);
        }

        let moved = Slot::new(destination.clone(), source.entries);
        let insert_at = match target {
            MoveTarget::Group(group) => self.group_end(group.as_deref()),
            MoveTarget::Before(anchor) => self.position(anchor).unwrap_or(self.slots.len()),
        };
        self.slots.insert(insert_at, moved);
        Ok(MoveOutcome::Moved { key: destination })
    }

    /// Move a whole group block before another group, or to the end.
    pub fn reorder_group(
        &mut self,
        from_group: &str,
        to_group: Option<&str>,
        position: GroupPosition,
    ) -> Result<(), AppError> {
        if !self.slots.iter().any(|slot| in_group(&slot.key, from_group)) {
            return Err(AppError::NotFound(from_group.to_string()));
        }
        let (block, rest): (Vec<Slot>, Vec<Slot>) =
            self.slots.drain(..).partition(|slot| in_group(&slot.key, from_group));
        self.slots = rest;

        let insert_at = match (position, to_group) {
            (GroupPosition::Before, Some(to_group)) => self
                .slots
                .iter()
                .position(|slot| in_group(&slot.key, to_group))
                .unwrap_or(self.slots.len()),
            _ => self.slots.len(),
        };
        let tail = self.slots.split_off(insert_at);
        self.slots.extend(block);
        self.slots.extend(tail);
        Ok(())
    }

    /// Rewrite every key under `old_group` (including nested groups) to live under `new_group`.
    pub fn rename_group(
        &mut self,
        old_group: &str,
        new_group: &str,
    ) -> Result<Vec<(SlotKey, SlotKey)>, AppError> {
        validate_group(new_group)?;
        let renames = self
            .slots
            .iter()
            .filter(|slot| slot.key.is_within(old_group))
            .map(|slot| -> Result<(SlotKey, SlotKey), AppError> {
                Ok((slot.key.clone(), slot.key.rebase(old_group, new_group)?))
            })
            .collect::<Result<Vec<_>, AppError>>()?;
        if renames.is_empty() {
            return Err(AppError::NotFound(old_group.to_string()));
        }

        for (_, new_key) in &renames {
            if self.find(new_key).is_some_and(|slot| !slot.key.is_within(old_group)) {
                return Err(AppError::Conflict { key: new_key.to_string() });
            }
        }

        for slot in &mut self.slots {
            if let Some((_, new_key)) = renames.iter().find(|(old, _)| old == &slot.key) {
                slot.key = new_key.clone();
            }
        }
        Ok(renames)
    }

    /// Remove every slot in a group (and nested groups).
    pub fn delete_group(&mut self, group: &str) -> Result<Vec<Slot>, AppError> {
        let (removed, kept): (Vec<Slot>, Vec<Slot>) =
            self.slots.drain(..).partition(|slot| slot.key.is_within(group));
        self.slots = kept;
        if removed.is_empty() {
            return Err(AppError::NotFound(group.to_string()));
        }
        Ok(removed)
    }

    fn insert(&mut self, slot: Slot) -> &Slot {
        let index = match self.position(&slot.key) {
            Some(index) => {
                self.slots[index] = slot;
                index
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        };
        &self.slots[index]
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.key.as_str() == key)
    }

    fn index_of(&self, key: &str) -> Result<usize, AppError> {
        self.position(key).ok_or_else(|| AppError::NotFound(key.to_string()))
    }

    fn remove_key(&mut self, key: &str) {
        if let Some(index) = self.position(key) {
            self.slots.remove(index);
        }
    }

    /// Index just past the last slot of `group`, or the registry end.
    fn group_end(&self, group: Option<&str>) -> usize {
        self.slots
            .iter()
            .rposition(|slot| slot.key.group() == group)
            .map_or(self.slots.len(), |index| index + 1)
    }
}

/// Direct membership only: nested groups are reordered as their own blocks.
fn in_group(key: &SlotKey, group: &str) -> bool {
    key.group().unwrap_or("") == group
}

fn validate_entries(key: &SlotKey, entries: &[ValueEntry]) -> Result<(), AppError> {
    if entries.is_empty() {
        return Err(AppError::validation(format!("Slot '{}' must define at least one value", key)));
    }
    for entry in entries {
        if let Some(weight) = entry.weight
            && !(0.0..=100.0).contains(&weight)
        {
            return Err(AppError::validation(format!(
                "Weight {} of '{}' in slot '{}' must be between 0 and 100",
                weight, entry.value, key
            )));
        }
        validate_condition(&entry.condition)?;
    }
    let explicit: f64 = entries.iter().filter_map(|entry| entry.weight).sum();
    if explicit > 100.0 + 1e-9 {
        return Err(AppError::validation(format!(
            "Explicit weights of slot '{}' sum to {}, which exceeds 100",
            key, explicit
        )));
    }
    Ok(())
}
