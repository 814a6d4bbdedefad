//! API Facade for the application.
//!
//! This module exposes high-level functions that glue together store creation
//! and command execution.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::adapters::{FilesystemSlotStore, RngDraw};
use crate::app::SlotService;
use crate::app::commands::{arrange, edit, inspect, resolve};
use crate::app::config::{load_config, resolve_root};
use crate::domain::config::paths::ROOT_ENV;
use crate::domain::find_similar_value;

pub use crate::app::commands::inspect::SlotView;
pub use crate::app::commands::resolve::{ResolveInput, ResolveOptions, ResolveOutcome};
pub use crate::domain::{
    AppError, MoveMode, MoveOutcome, MoveTarget, ResolveWarning, Selection, Slot, SlotKey,
    WildslotConfig,
};

pub type FilesystemService = SlotService<FilesystemSlotStore>;

/// Open the slot store selected by `--root`/`--config`, the environment, and
/// `wildslot.toml` in the current directory.
pub fn open(root: Option<&Path>, config_path: Option<&Path>) -> Result<FilesystemService, AppError> {
    let cwd = std::env::current_dir()?;
    let loaded = load_config(config_path, &cwd)?;
    let env_root = std::env::var(ROOT_ENV).ok();
    let root = resolve_root(root, env_root.as_deref(), &loaded, &cwd);
    open_at(root, loaded.config)
}

/// Open the slots under `root` with an already-loaded configuration.
pub fn open_at(
    root: impl Into<PathBuf>,
    config: WildslotConfig,
) -> Result<FilesystemService, AppError> {
    config.validate()?;
    let store = FilesystemSlotStore::from_config(root.into(), &config.store);
    SlotService::new(store, config)
}

pub fn list(service: &FilesystemService, group: Option<&str>) -> Result<Vec<SlotKey>, AppError> {
    inspect::list(service, group)
}

pub fn groups(service: &FilesystemService) -> Result<Vec<String>, AppError> {
    inspect::groups(service)
}

pub fn show(service: &FilesystemService, key: &str) -> Result<SlotView, AppError> {
    inspect::show(service, key)
}

pub fn put(service: &FilesystemService, key: &str, raw_text: &str) -> Result<Slot, AppError> {
    edit::put(service, key, raw_text)
}

pub fn rename(service: &FilesystemService, old_key: &str, new_key: &str) -> Result<SlotKey, AppError> {
    edit::rename(service, old_key, new_key)
}

pub fn delete(service: &FilesystemService, key: &str) -> Result<Slot, AppError> {
    edit::delete(service, key)
}

pub fn move_slot(
    service: &FilesystemService,
    from_key: &str,
    target: &MoveTarget,
    mode: MoveMode,
    force: bool,
) -> Result<MoveOutcome, AppError> {
    arrange::move_slot(service, from_key, target, mode, force)
}

pub fn reorder_group(
    service: &FilesystemService,
    from_group: &str,
    before_group: Option<&str>,
) -> Result<(), AppError> {
    arrange::reorder_group(service, from_group, before_group)
}

pub fn rename_group(
    service: &FilesystemService,
    old_group: &str,
    new_group: &str,
) -> Result<Vec<(SlotKey, SlotKey)>, AppError> {
    arrange::rename_group(service, old_group, new_group)
}

pub fn delete_group(service: &FilesystemService, group: &str) -> Result<Vec<Slot>, AppError> {
    arrange::delete_group(service, group)
}

/// Resolve with a seeded generator when `seed` is given, otherwise from entropy.
pub fn resolve(
    service: &FilesystemService,
    input: &ResolveInput,
    options: &ResolveOptions,
    seed: Option<u64>,
) -> Result<ResolveOutcome, AppError> {
    let mut draw = RngDraw::new(seed);
    resolve::execute(service, input, options, &mut draw)
}

/// Values recorded by the most recent resolution under this root.
pub fn last(service: &FilesystemService) -> Result<BTreeMap<SlotKey, String>, AppError> {
    resolve::last(service.store())
}

/// Closest candidate to `old_value`, or `Selection::Random` when none is close.
pub fn similar<S: AsRef<str>>(old_value: &str, candidates: &[S]) -> Selection {
    find_similar_value(Some(old_value), candidates)
}
