//! Copy-on-write registry snapshot shared between readers and writers.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::{AppError, SlotRegistry};

#[derive(Debug, Default)]
pub struct SharedRegistry {
    current: RwLock<Arc<SlotRegistry>>,
}

impl SharedRegistry {
    pub fn new(registry: SlotRegistry) -> Self {
        Self { current: RwLock::new(Arc::new(registry)) }
    }

    /// The registry as of now. Later updates never alter a taken snapshot.
    pub fn snapshot(&self) -> Result<Arc<SlotRegistry>, AppError> {
        Ok(Arc::clone(&*self.read()?))
    }

    /// Apply `mutate` to a private copy, persist it, then publish it.
    ///
    /// If either step fails the published snapshot is left untouched.
    pub fn update<T>(
        &self,
        mutate: impl FnOnce(&mut SlotRegistry) -> Result<T, AppError>,
        persist: impl FnOnce(&SlotRegistry, &T) -> Result<(), AppError>,
    ) -> Result<T, AppError> {
        let mut current = self.write()?;
        let mut draft = SlotRegistry::clone(&current);
        let outcome = mutate(&mut draft)?;
        persist(&draft, &outcome)?;
        *current = Arc::new(draft);
        Ok(outcome)
    }

    /// Publish a registry reloaded from storage.
    pub fn replace(&self, registry: SlotRegistry) -> Result<(), AppError> {
        *self.write()? = Arc::new(registry);
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Arc<SlotRegistry>>, AppError> {
        self.current.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Arc<SlotRegistry>>, AppError> {
        self.current.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> AppError {
    AppError::Io(std::io::Error::other("registry lock poisoned"))
}
