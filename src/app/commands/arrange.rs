//! Moving slots and whole groups. Every successful change rewrites the
//! stored order.

use crate::app::SlotService;
use crate::domain::{AppError, GroupPosition, MoveMode, MoveOutcome, MoveTarget, Slot, SlotKey};
use crate::ports::SlotStore;

pub fn move_slot<S: SlotStore>(
    service: &SlotService<S>,
    from_key: &str,
    target: &MoveTarget,
    mode: MoveMode,
    force: bool,
) -> Result<MoveOutcome, AppError> {
    service.update(
        |draft| draft.move_slot(from_key, target, mode, force),
        |store, draft, outcome| match outcome {
            MoveOutcome::Moved { .. } => store.persist_order(draft),
            MoveOutcome::Conflict { .. } => Ok(()),
        },
    )
}

pub fn reorder_group<S: SlotStore>(
    service: &SlotService<S>,
    from_group: &str,
    before_group: Option<&str>,
) -> Result<(), AppError> {
    let position = if before_group.is_some() { GroupPosition::Before } else { GroupPosition::End };
    service.update(
        |draft| draft.reorder_group(from_group, before_group, position),
        |store, draft, _| store.persist_order(draft),
    )
}

pub fn rename_group<S: SlotStore>(
    service: &SlotService<S>,
    old_group: &str,
    new_group: &str,
) -> Result<Vec<(SlotKey, SlotKey)>, AppError> {
    service.update(
        |draft| draft.rename_group(old_group, new_group),
        |store, draft, _| store.persist_order(draft),
    )
}

pub fn delete_group<S: SlotStore>(
    service: &SlotService<S>,
    group: &str,
) -> Result<Vec<Slot>, AppError> {
    service.update(|draft| draft.delete_group(group), |store, draft, _| store.persist_order(draft))
}
