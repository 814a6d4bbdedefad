//! wildslot: weighted, conditional wildcard slots expanded into prompt text.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use app::SlotService;
pub use app::api::{
    FilesystemService, ResolveInput, ResolveOptions, ResolveOutcome, SlotView, open, open_at,
};
pub use domain::{
    AppError, MoveMode, MoveOutcome, MoveTarget, ResolveWarning, ResolvedPrompt, Resolver,
    Selection, SelectionState, Slot, SlotKey, SlotRegistry, ValueEntry, WildslotConfig,
};
