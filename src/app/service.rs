use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::app::shared_registry::SharedRegistry;
use crate::domain::{
    AppError, ResolvedPrompt, Resolver, SelectionState, SlotKey, SlotRegistry, WildslotConfig,
};
use crate::ports::{Draw, SlotStore};

/// Application context: a slot store, the registry snapshot loaded from it,
/// and the values produced by the most recent resolution.
#[derive(Debug)]
pub struct SlotService<S: SlotStore> {
    store: S,
    config: WildslotConfig,
    registry: SharedRegistry,
    last_generated: Mutex<BTreeMap<SlotKey, String>>,
}

impl<S: SlotStore> SlotService<S> {
    /// Load the registry from `store`.
    pub fn new(store: S, config: WildslotConfig) -> Result<Self, AppError> {
        let registry = store.load_registry()?;
        Ok(Self {
            store,
            config,
            registry: SharedRegistry::new(registry),
            last_generated: Mutex::new(BTreeMap::new()),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &WildslotConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Result<Arc<SlotRegistry>, AppError> {
        self.registry.snapshot()
    }

    /// Mutate the registry and persist through the store, atomically.
    pub fn update<T>(
        &self,
        mutate: impl FnOnce(&mut SlotRegistry) -> Result<T, AppError>,
        persist: impl FnOnce(&S, &SlotRegistry, &T) -> Result<(), AppError>,
    ) -> Result<T, AppError> {
        self.registry.update(mutate, |draft, outcome| persist(&self.store, draft, outcome))
    }

    /// Re-read the store and publish the result.
    pub fn reload(&self) -> Result<Arc<SlotRegistry>, AppError> {
        self.registry.replace(self.store.load_registry()?)?;
        self.snapshot()
    }

    /// Expand a template against the current snapshot.
    pub fn resolve<D: Draw + ?Sized>(
        &self,
        template: &str,
        selection: &SelectionState,
        draw: &mut D,
    ) -> Result<ResolvedPrompt, AppError> {
        let registry = self.snapshot()?;
        let prompt = self.resolver(&registry).resolve(template, selection, draw)?;
        self.remember(&prompt)?;
        Ok(prompt)
    }

    pub fn resolve_slot<D: Draw + ?Sized>(
        &self,
        key: &str,
        selection: &SelectionState,
        draw: &mut D,
    ) -> Result<ResolvedPrompt, AppError> {
        let registry = self.snapshot()?;
        let prompt = self.resolver(&registry).resolve_slot(key, selection, draw)?;
        self.remember(&prompt)?;
        Ok(prompt)
    }

    pub fn generate<D: Draw + ?Sized>(
        &self,
        selection: &SelectionState,
        draw: &mut D,
    ) -> Result<ResolvedPrompt, AppError> {
        let registry = self.snapshot()?;
        let prompt = self.resolver(&registry).generate(selection, draw)?;
        self.remember(&prompt)?;
        Ok(prompt)
    }

    /// Values produced by the most recent resolution through this service.
    pub fn get_last_generated(&self) -> Result<BTreeMap<SlotKey, String>, AppError> {
        Ok(self.last_generated.lock().map_err(|_| poisoned())?.clone())
    }

    fn resolver<'r>(&self, registry: &'r SlotRegistry) -> Resolver<'r> {
        Resolver::new(registry).with_options(self.config.resolver.options())
    }

    fn remember(&self, prompt: &ResolvedPrompt) -> Result<(), AppError> {
        *self.last_generated.lock().map_err(|_| poisoned())? = prompt.last_generated.clone();
        Ok(())
    }
}

fn poisoned() -> AppError {
    AppError::Io(std::io::Error::other("last-generated lock poisoned"))
}
