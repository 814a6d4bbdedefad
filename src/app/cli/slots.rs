//! Slot inspection and editing commands.

use std::io::Read;
use std::path::PathBuf;

use crate::app::api::{self, FilesystemService};
use crate::domain::AppError;

pub fn run_list(service: &FilesystemService, group: Option<&str>) -> Result<(), AppError> {
    for key in api::list(service, group)? {
        println!("{}", key);
    }
    Ok(())
}

pub fn run_groups(service: &FilesystemService) -> Result<(), AppError> {
    for group in api::groups(service)? {
        if group.is_empty() {
            println!("(root)");
        } else {
            println!("{}", group);
        }
    }
    Ok(())
}

pub fn run_show(service: &FilesystemService, key: &str, json: bool) -> Result<(), AppError> {
    let view = api::show(service, key)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("{}", view.raw_text);
    }
    Ok(())
}

pub fn run_put(
    service: &FilesystemService,
    key: &str,
    values: Vec<String>,
    file: Option<PathBuf>,
) -> Result<(), AppError> {
    let raw_text = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None if !values.is_empty() => values.join("\n"),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let slot = api::put(service, key, &raw_text)?;
    println!("✅ Saved {} ({} value(s))", slot.key, slot.entries.len());
    Ok(())
}

pub fn run_rename(service: &FilesystemService, old_key: &str, new_key: &str) -> Result<(), AppError> {
    let renamed = api::rename(service, old_key, new_key)?;
    println!("✅ Renamed {} to {}", old_key, renamed);
    Ok(())
}

pub fn run_delete(service: &FilesystemService, key: &str) -> Result<(), AppError> {
    let removed = api::delete(service, key)?;
    println!("✅ Deleted {}", removed.key);
    Ok(())
}
