//! Resolving templates, single slots, or the managed template.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::app::SlotService;
use crate::domain::resolver::append_with_separator;
use crate::domain::{
    AppError, ResolveWarning, ResolvedPrompt, SelectionState, SlotKey, SlotRegistry,
};
use crate::ports::{Draw, LastGeneratedStore, SlotStore};

/// What to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveInput {
    /// One or more templates; results are joined with the configured separator.
    Templates(Vec<String>),
    /// A single slot key (same as the template `{key}`).
    Slot(String),
    /// The configured managed template slot.
    Generate,
}

/// How the selection state is assembled before resolving.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// `KEY=VALUE` pairs; `VALUE` may be `random` or `disabled`.
    pub selections: Vec<String>,
    /// Start with every managed slot disabled.
    pub disable_all: bool,
    /// Pin the values recorded by the previous run.
    pub pin_last: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveOutcome {
    pub text: String,
    pub last_generated: BTreeMap<SlotKey, String>,
    pub warnings: Vec<ResolveWarning>,
}

/// Resolve `input` and record the produced values in the store.
pub fn execute<S, D>(
    service: &SlotService<S>,
    input: &ResolveInput,
    options: &ResolveOptions,
    draw: &mut D,
) -> Result<ResolveOutcome, AppError>
where
    S: SlotStore + LastGeneratedStore,
    D: Draw + ?Sized,
{
    let registry = service.snapshot()?;
    let template_key = &service.config().resolver.template_key;
    let selection = build_selection(service.store(), &registry, template_key, options)?;

    let prompts: Vec<ResolvedPrompt> = match input {
        ResolveInput::Templates(templates) => templates
            .iter()
            .map(|template| service.resolve(template, &selection, draw))
            .collect::<Result<_, _>>()?,
        ResolveInput::Slot(key) => vec![service.resolve_slot(key, &selection, draw)?],
        ResolveInput::Generate => vec![service.generate(&selection, draw)?],
    };

    let separator = &service.config().resolver.separator;
    let mut outcome =
        ResolveOutcome { text: String::new(), last_generated: BTreeMap::new(), warnings: Vec::new() };
    for prompt in prompts {
        outcome.text = append_with_separator(&outcome.text, &prompt.text, separator);
        for (key, value) in prompt.last_generated {
            outcome.last_generated.entry(key).or_insert(value);
        }
        outcome.warnings.extend(prompt.warnings);
    }

    service.store().write_last_generated(&outcome.last_generated)?;
    Ok(outcome)
}

/// Values recorded by the most recent resolution.
pub fn last<S: LastGeneratedStore>(store: &S) -> Result<BTreeMap<SlotKey, String>, AppError> {
    store.read_last_generated()
}

fn build_selection<S: LastGeneratedStore>(
    store: &S,
    registry: &SlotRegistry,
    template_key: &str,
    options: &ResolveOptions,
) -> Result<SelectionState, AppError> {
    let mut selection = SelectionState::for_managed(registry, template_key);
    if options.disable_all {
        selection.set_all_disabled();
    }
    if options.pin_last {
        // Only literal values can be pinned; expanded text is drawn again.
        let mut last = store.read_last_generated()?;
        last.retain(|key, value| registry.find(key).is_some_and(|slot| slot.contains_value(value)));
        selection.pin_last_generated(&last);
    }
    for (key, choice) in SelectionState::from_pairs(&options.selections)?.iter() {
        selection.set(key.clone(), choice.clone());
    }
    selection.reconcile(registry);
    Ok(selection)
}
