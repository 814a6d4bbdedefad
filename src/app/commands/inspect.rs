use serde::Serialize;

use crate::app::SlotService;
use crate::domain::identifiers::validate_group;
use crate::domain::{AppError, SlotKey, ValueEntry};
use crate::ports::SlotStore;

/// One slot as shown to users.
#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    pub key: SlotKey,
    pub raw_text: String,
    pub entries: Vec<ValueEntry>,
}

/// Keys in registry order, optionally limited to a group and its subgroups.
pub fn list<S: SlotStore>(
    service: &SlotService<S>,
    group: Option<&str>,
) -> Result<Vec<SlotKey>, AppError> {
    if let Some(group) = group {
        validate_group(group)?;
    }
    let registry = service.snapshot()?;
    Ok(registry.list_keys(group).into_iter().cloned().collect())
}

/// Distinct groups in first-appearance order; `""` is the root group.
pub fn groups<S: SlotStore>(service: &SlotService<S>) -> Result<Vec<String>, AppError> {
    let registry = service.snapshot()?;
    Ok(registry.list_groups().into_iter().map(str::to_string).collect())
}

pub fn show<S: SlotStore>(service: &SlotService<S>, key: &str) -> Result<SlotView, AppError> {
    let registry = service.snapshot()?;
    let slot = registry.get(key)?;
    Ok(SlotView {
        key: slot.key.clone(),
        raw_text: registry.raw_text(key)?,
        entries: slot.entries.clone(),
    })
}
