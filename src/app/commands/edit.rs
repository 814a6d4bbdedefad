use crate::app::SlotService;
use crate::domain::{AppError, Slot, SlotKey};
use crate::ports::SlotStore;

/// Create or replace a slot from raw text.
pub fn put<S: SlotStore>(service: &SlotService<S>, key: &str, raw_text: &str) -> Result<Slot, AppError> {
    service.update(
        |draft| draft.put(key, raw_text).cloned(),
        |store, _, slot| store.persist_slot(&slot.key, raw_text),
    )
}

pub fn rename<S: SlotStore>(
    service: &SlotService<S>,
    old_key: &str,
    new_key: &str,
) -> Result<SlotKey, AppError> {
    service.update(
        |draft| draft.rename(old_key, new_key),
        |store, _, renamed| {
            let old_key = SlotKey::new(old_key)?;
            if &old_key == renamed {
                return Ok(());
            }
            store.persist_rename(&old_key, renamed)
        },
    )
}

pub fn delete<S: SlotStore>(service: &SlotService<S>, key: &str) -> Result<Slot, AppError> {
    service.update(|draft| draft.delete(key), |store, _, removed| store.persist_delete(&removed.key))
}
