use std::collections::BTreeMap;

use crate::domain::{AppError, SlotKey, SlotRegistry};

/// Port for loading and persisting slot definitions.
///
/// Every mutation of the shared registry is followed by exactly one persist
/// call; the new snapshot is published only when that call succeeds.
pub trait SlotStore {
    /// Read every slot the store knows about, in stored order.
    fn load_registry(&self) -> Result<SlotRegistry, AppError>;

    /// Write (create or replace) one slot from its raw text.
    fn persist_slot(&self, key: &SlotKey, raw_text: &str) -> Result<(), AppError>;

    fn persist_delete(&self, key: &SlotKey) -> Result<(), AppError>;

    fn persist_rename(&self, old_key: &SlotKey, new_key: &SlotKey) -> Result<(), AppError>;

    /// Rewrite stored order (and content) to match `registry`. Used after
    /// moves, copies, and group operations.
    fn persist_order(&self, registry: &SlotRegistry) -> Result<(), AppError>;
}

/// Port for the record of the most recent resolution's choices.
pub trait LastGeneratedStore {
    fn read_last_generated(&self) -> Result<BTreeMap<SlotKey, String>, AppError>;

    fn write_last_generated(&self, values: &BTreeMap<SlotKey, String>) -> Result<(), AppError>;
}
