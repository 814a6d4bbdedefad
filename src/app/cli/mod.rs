//! CLI Adapter.

mod arrange;
mod resolve;
mod slots;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::app::api::{self, FilesystemService};
use crate::domain::AppError;

#[derive(Parser)]
#[command(name = "wildslot")]
#[command(version)]
#[command(about = "Manage wildcard slots and expand prompt templates", long_about = None)]
struct Cli {
    /// Slot directory (overrides WILDSLOT_ROOT and wildslot.toml)
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Configuration file (default: ./wildslot.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List slot keys in stored order
    #[clap(visible_alias = "ls")]
    List {
        /// Only keys in this group and its subgroups
        #[arg(short, long)]
        group: Option<String>,
    },
    /// List groups in first-appearance order
    Groups,
    /// Print a slot's raw definition
    Show {
        key: String,
        /// Print parsed entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create or replace a slot
    Put {
        key: String,
        /// Entry lines (`[condition =>][weight,]value`); repeatable
        #[arg(short, long = "value", conflicts_with = "file", allow_hyphen_values = true)]
        values: Vec<String>,
        /// Read the raw definition from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Rename a slot
    #[clap(visible_alias = "mv-key")]
    Rename { old_key: String, new_key: String },
    /// Delete a slot
    #[clap(visible_alias = "rm")]
    Delete { key: String },
    /// Move or copy a slot into a group or before another slot
    #[clap(visible_alias = "mv")]
    Move {
        key: String,
        /// Destination group (omit for the root group)
        #[arg(short, long, conflicts_with = "before")]
        group: Option<String>,
        /// Insert before this slot, adopting its group
        #[arg(short, long)]
        before: Option<String>,
        /// Keep the source slot
        #[arg(long)]
        copy: bool,
        /// Replace an existing slot at the destination
        #[arg(long)]
        force: bool,
    },
    /// Move a whole group before another group, or to the end
    ReorderGroup {
        group: String,
        #[arg(short, long)]
        before: Option<String>,
    },
    /// Rename a group and every subgroup under it
    RenameGroup { old_group: String, new_group: String },
    /// Delete a group and every slot under it
    DeleteGroup { group: String },
    /// Expand one or more templates
    #[clap(visible_alias = "r")]
    Resolve {
        #[arg(required = true)]
        templates: Vec<String>,
        #[command(flatten)]
        args: resolve::ResolveArgs,
    },
    /// Resolve a single slot
    Slot {
        key: String,
        #[command(flatten)]
        args: resolve::ResolveArgs,
    },
    /// Expand the managed template slot
    #[clap(visible_alias = "g")]
    Generate {
        #[command(flatten)]
        args: resolve::ResolveArgs,
    },
    /// Show the values chosen by the latest resolution
    Last {
        #[arg(long)]
        json: bool,
    },
    /// Pick the candidate closest to a vanished value
    Similar {
        old_value: String,
        candidates: Vec<String>,
    },
}

/// Entry point for the CLI.
pub fn run() {
    let cli = Cli::parse();

    let result: Result<i32, AppError> = match cli.command {
        Commands::Similar { old_value, candidates } => {
            println!("{}", api::similar(&old_value, candidates.as_slice()));
            Ok(0)
        }
        command => {
            api::open(cli.root.as_deref(), cli.config.as_deref()).and_then(|service| {
                for warning in service.store().load_warnings()? {
                    eprintln!("[WARN] {}", warning);
                }
                dispatch(&service, command)
            })
        }
    };

    match result {
        Ok(exit_code) => {
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn dispatch(service: &FilesystemService, command: Commands) -> Result<i32, AppError> {
    match command {
        Commands::List { group } => slots::run_list(service, group.as_deref()).map(|_| 0),
        Commands::Groups => slots::run_groups(service).map(|_| 0),
        Commands::Show { key, json } => slots::run_show(service, &key, json).map(|_| 0),
        Commands::Put { key, values, file } => slots::run_put(service, &key, values, file).map(|_| 0),
        Commands::Rename { old_key, new_key } => {
            slots::run_rename(service, &old_key, &new_key).map(|_| 0)
        }
        Commands::Delete { key } => slots::run_delete(service, &key).map(|_| 0),
        Commands::Move { key, group, before, copy, force } => {
            arrange::run_move(service, &key, group, before, copy, force)
        }
        Commands::ReorderGroup { group, before } => {
            arrange::run_reorder_group(service, &group, before.as_deref()).map(|_| 0)
        }
        Commands::RenameGroup { old_group, new_group } => {
            arrange::run_rename_group(service, &old_group, &new_group).map(|_| 0)
        }
        Commands::DeleteGroup { group } => arrange::run_delete_group(service, &group).map(|_| 0),
        Commands::Resolve { templates, args } => {
            resolve::run_resolve(service, api::ResolveInput::Templates(templates), args)
        }
        Commands::Slot { key, args } => {
            resolve::run_resolve(service, api::ResolveInput::Slot(key), args)
        }
        Commands::Generate { args } => resolve::run_resolve(service, api::ResolveInput::Generate, args),
        Commands::Last { json } => resolve::run_last(service, json).map(|_| 0),
        Commands::Similar { .. } => unreachable!("handled before opening the store"),
    }
}
