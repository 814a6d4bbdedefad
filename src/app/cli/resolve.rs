//! Template resolution commands.

use clap::Args;

use crate::app::api::{self, FilesystemService, ResolveInput, ResolveOptions};
use crate::domain::AppError;

#[derive(Args, Debug, Clone, Default)]
pub struct ResolveArgs {
    /// Seed for reproducible draws
    #[arg(long)]
    seed: Option<u64>,
    /// Selection `KEY=VALUE` (`random`, `disabled`, or a literal value); repeatable
    #[arg(short, long = "select")]
    selections: Vec<String>,
    /// Reuse the values chosen by the previous run
    #[arg(long)]
    pin_last: bool,
    /// Start with every managed slot disabled
    #[arg(long)]
    disable_all: bool,
    /// Print the full outcome as JSON
    #[arg(long)]
    json: bool,
}

pub fn run_resolve(
    service: &FilesystemService,
    input: ResolveInput,
    args: ResolveArgs,
) -> Result<i32, AppError> {
    let options = ResolveOptions {
        selections: args.selections,
        disable_all: args.disable_all,
        pin_last: args.pin_last,
    };
    let outcome = api::resolve(service, &input, &options, args.seed)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(0);
    }
    for warning in &outcome.warnings {
        eprintln!("[WARN] {}", warning);
    }
    println!("{}", outcome.text);
    Ok(0)
}

pub fn run_last(service: &FilesystemService, json: bool) -> Result<(), AppError> {
    let last = api::last(service)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&last)?);
        return Ok(());
    }
    for (key, value) in &last {
        println!("{} = {}", key, value);
    }
    Ok(())
}
