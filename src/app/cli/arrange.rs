//! Moving slots and groups.

use std::io::{ErrorKind, IsTerminal};

use dialoguer::{Confirm, Error as DialoguerError};

use crate::app::api::{self, FilesystemService, MoveMode, MoveOutcome, MoveTarget, SlotKey};
use crate::domain::AppError;

pub fn run_move(
    service: &FilesystemService,
    key: &str,
    group: Option<String>,
    before: Option<String>,
    copy: bool,
    force: bool,
) -> Result<i32, AppError> {
    let target = match before {
        Some(before) => MoveTarget::Before(SlotKey::new(&before)?),
        None => MoveTarget::Group(group.filter(|group| !group.is_empty())),
    };
    let mode = if copy { MoveMode::Copy } else { MoveMode::Move };

    let outcome = match api::move_slot(service, key, &target, mode, force)? {
        MoveOutcome::Conflict { key: taken } => {
            if !confirm_replace(&taken)? {
                eprintln!("[WARN] '{}' already exists; rerun with --force to replace it", taken);
                return Ok(1);
            }
            api::move_slot(service, key, &target, mode, true)?
        }
        moved => moved,
    };

    if let MoveOutcome::Moved { key: moved } = outcome {
        let verb = if copy { "Copied" } else { "Moved" };
        println!("✅ {} {} to {}", verb, key, moved);
    }
    Ok(0)
}

fn confirm_replace(key: &SlotKey) -> Result<bool, AppError> {
    if !(std::io::stdin().is_terminal() && std::io::stdout().is_terminal()) {
        return Ok(false);
    }
    match Confirm::new().with_prompt(format!("Replace existing slot '{}'?", key)).default(false).interact() {
        Ok(answer) => Ok(answer),
        Err(DialoguerError::IO(err)) if err.kind() == ErrorKind::Interrupted => Ok(false),
        Err(err) => Err(AppError::Validation(format!("Failed to read confirmation: {}", err))),
    }
}

pub fn run_reorder_group(
    service: &FilesystemService,
    group: &str,
    before: Option<&str>,
) -> Result<(), AppError> {
    api::reorder_group(service, group, before)?;
    match before {
        Some(before) => println!("✅ Moved group {} before {}", group, before),
        None => println!("✅ Moved group {} to the end", group),
    }
    Ok(())
}

pub fn run_rename_group(
    service: &FilesystemService,
    old_group: &str,
    new_group: &str,
) -> Result<(), AppError> {
    let renamed = api::rename_group(service, old_group, new_group)?;
    println!("✅ Renamed group {} to {} ({} slot(s))", old_group, new_group, renamed.len());
    Ok(())
}

pub fn run_delete_group(service: &FilesystemService, group: &str) -> Result<(), AppError> {
    let removed = api::delete_group(service, group)?;
    println!("✅ Deleted group {} ({} slot(s))", group, removed.len());
    Ok(())
}
