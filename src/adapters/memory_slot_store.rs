use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::{AppError, Slot, SlotKey, SlotRegistry, parse_entries, serialize_entries};
use crate::ports::{LastGeneratedStore, SlotStore};

/// In-memory slot store for testing.
#[derive(Debug, Clone, Default)]
pub struct MemorySlotStore {
    // Using Arc<Mutex> so clones observe each other's writes
    slots: Arc<Mutex<Vec<(SlotKey, String)>>>,
    last_generated: Arc<Mutex<BTreeMap<SlotKey, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with `(key, raw_text)` pairs.
    pub fn with_slots(slots: &[(&str, &str)]) -> Result<Self, AppError> {
        let store = Self::new();
        {
            let mut stored = lock(&store.slots)?;
            for (key, raw) in slots {
                stored.push((SlotKey::new(key)?, raw.to_string()));
            }
        }
        Ok(store)
    }

    /// Make every subsequent persist call fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw text currently stored for `key`.
    pub fn raw_text(&self, key: &str) -> Option<String> {
        let slots = lock(&self.slots).ok()?;
        slots.iter().find(|(k, _)| k.as_str() == key).map(|(_, raw)| raw.clone())
    }

    pub fn keys(&self) -> Vec<String> {
        lock(&self.slots)
            .map(|slots| slots.iter().map(|(k, _)| k.to_string()).collect())
            .unwrap_or_default()
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Io(io::Error::other("memory store is read-only")));
        }
        Ok(())
    }
}

impl SlotStore for MemorySlotStore {
    fn load_registry(&self) -> Result<SlotRegistry, AppError> {
        let slots = lock(&self.slots)?;
        Ok(SlotRegistry::from_slots(
            slots.iter().map(|(key, raw)| Slot::new(key.clone(), parse_entries(raw))),
        ))
    }

    fn persist_slot(&self, key: &SlotKey, raw_text: &str) -> Result<(), AppError> {
        self.check_writable()?;
        let mut slots = lock(&self.slots)?;
        match slots.iter_mut().find(|(existing, _)| existing == key) {
            Some((_, raw)) => *raw = raw_text.to_string(),
            None => slots.push((key.clone(), raw_text.to_string())),
        }
        Ok(())
    }

    fn persist_delete(&self, key: &SlotKey) -> Result<(), AppError> {
        self.check_writable()?;
        lock(&self.slots)?.retain(|(existing, _)| existing != key);
        Ok(())
    }

    fn persist_rename(&self, old_key: &SlotKey, new_key: &SlotKey) -> Result<(), AppError> {
        self.check_writable()?;
        let mut slots = lock(&self.slots)?;
        if let Some((existing, _)) = slots.iter_mut().find(|(existing, _)| existing == old_key) {
            *existing = new_key.clone();
        }
        Ok(())
    }

    fn persist_order(&self, registry: &SlotRegistry) -> Result<(), AppError> {
        self.check_writable()?;
        *lock(&self.slots)? = registry
            .slots()
            .iter()
            .map(|slot| (slot.key.clone(), serialize_entries(&slot.entries)))
            .collect();
        Ok(())
    }
}

impl LastGeneratedStore for MemorySlotStore {
    fn read_last_generated(&self) -> Result<BTreeMap<SlotKey, String>, AppError> {
        Ok(lock(&self.last_generated)?.clone())
    }

    fn write_last_generated(&self, values: &BTreeMap<SlotKey, String>) -> Result<(), AppError> {
        self.check_writable()?;
        *lock(&self.last_generated)? = values.clone();
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, AppError> {
    mutex.lock().map_err(|_| AppError::Io(io::Error::other("memory store lock poisoned")))
}
