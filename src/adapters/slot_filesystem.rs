//! Directory-backed slot store.
//!
//! Every `*.txt` file under the root is one slot (key = relative path without
//! extension, normalized). Every other `*.yaml`/`*.yml` file contributes its
//! nested mappings as `a/b/c` keys. The managed file holds slots written
//! through the tool; its keys come first, in file order, and shadow same-named
//! slots from the other files.
//!
//! A managed key mapped to `null` is a deletion marker. It hides the slot a
//! shared YAML file still defines, so deletes and renames survive a reload.
//! Files whose names do not form a valid key are skipped and reported through
//! [`FilesystemSlotStore::load_warnings`].

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_yaml::{Mapping, Value};

use crate::domain::config::paths::{DEFAULT_LAST_GENERATED_FILE, DEFAULT_MANAGED_FILE};
use crate::domain::identifiers::normalize_key;
use crate::domain::slot::{parse_entries, parse_line, serialize_body};
use crate::domain::{AppError, Slot, SlotKey, SlotRegistry, StoreConfig, ValueEntry};
use crate::ports::{LastGeneratedStore, SlotStore};

/// Managed file contents in file order; `None` is a deletion marker.
type ManagedSlots = Vec<(SlotKey, Option<Vec<String>>)>;

/// Filesystem-based slot store implementation.
#[derive(Debug, Clone)]
pub struct FilesystemSlotStore {
    root: PathBuf,
    managed_file: String,
    last_generated_file: String,
    skipped: Arc<Mutex<Vec<String>>>,
}

impl FilesystemSlotStore {
    /// Create a store for the given root directory with default file names.
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            managed_file: DEFAULT_MANAGED_FILE.to_string(),
            last_generated_file: DEFAULT_LAST_GENERATED_FILE.to_string(),
            skipped: Arc::default(),
        }
    }

    pub fn from_config(root: PathBuf, config: &StoreConfig) -> Self {
        Self {
            root,
            managed_file: config.managed_file.clone(),
            last_generated_file: config.last_generated_file.clone(),
            skipped: Arc::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Problems met by the latest load: files and YAML keys that were
    /// skipped because they do not form valid slot keys.
    pub fn load_warnings(&self) -> Result<Vec<String>, AppError> {
        Ok(lock(&self.skipped)?.clone())
    }

    fn managed_path(&self) -> PathBuf {
        self.root.join(&self.managed_file)
    }

    fn last_generated_path(&self) -> PathBuf {
        self.root.join(&self.last_generated_file)
    }

    fn read_managed(&self) -> Result<ManagedSlots, AppError> {
        let path = self.managed_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mapping: Mapping = serde_yaml::from_str(&content).map_err(|e| yaml_error(&path, e))?;
        let mut slots = Vec::with_capacity(mapping.len());
        for (key, value) in &mapping {
            let key = scalar_text(key)
                .ok_or_else(|| yaml_error(&path, "slot keys must be strings"))?;
            let key = SlotKey::new(&key).map_err(|e| yaml_error(&path, e))?;
            let lines = match value {
                Value::Sequence(items) => Some(items.iter().filter_map(scalar_text).collect()),
                Value::Null => None,
                other => match scalar_text(other) {
                    Some(text) => Some(vec![text]),
                    None => {
                        return Err(yaml_error(&path, format!("'{}' must hold a list", key)));
                    }
                },
            };
            slots.push((key, lines));
        }
        Ok(slots)
    }

    fn write_managed(&self, slots: &ManagedSlots) -> Result<(), AppError> {
        let mut mapping = Mapping::new();
        for (key, lines) in slots {
            let value = match lines {
                Some(lines) => {
                    Value::Sequence(lines.iter().map(|line| Value::String(line.clone())).collect())
                }
                None => Value::Null,
            };
            mapping.insert(Value::String(key.to_string()), value);
        }
        let path = self.managed_path();
        let content = serde_yaml::to_string(&mapping).map_err(|e| yaml_error(&path, e))?;
        fs::create_dir_all(&self.root)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Slot files under the root, sorted, excluding the files this store owns.
    fn slot_files(&self) -> Result<Vec<PathBuf>, AppError> {
        let mut files = Vec::new();
        if self.root.is_dir() {
            collect_files(&self.root, &mut files)?;
        }
        let owned = [self.managed_path(), self.last_generated_path()];
        files.retain(|path| !owned.contains(path) && slot_extension(path).is_some());
        files.sort();
        Ok(files)
    }

    /// Key a file under the root is addressed by. `Err` holds the reason the
    /// file is skipped.
    fn file_key(&self, path: &Path) -> Result<SlotKey, String> {
        let relative = path.strip_prefix(&self.root).unwrap_or(path).with_extension("");
        let key = normalize_key(&relative.to_string_lossy());
        SlotKey::new(&key).map_err(|_| {
            format!("{}: '{}' is not a valid slot key; file skipped", path.display(), key)
        })
    }

    fn text_files_by_key(&self) -> Result<Vec<(SlotKey, PathBuf)>, AppError> {
        let mut found = Vec::new();
        for path in self.slot_files()? {
            if slot_extension(&path) == Some(SlotFileKind::Text)
                && let Ok(key) = self.file_key(&path)
            {
                found.push((key, path));
            }
        }
        Ok(found)
    }

    /// Every slot defined outside the managed file, tagged with its file kind.
    fn file_slots(
        &self,
        warnings: &mut Vec<String>,
    ) -> Result<Vec<(SlotFileKind, Slot)>, AppError> {
        let mut found = Vec::new();
        for path in self.slot_files()? {
            match slot_extension(&path) {
                Some(SlotFileKind::Text) => {
                    let key = match self.file_key(&path) {
                        Ok(key) => key,
                        Err(warning) => {
                            warnings.push(warning);
                            continue;
                        }
                    };
                    let content = fs::read_to_string(&path)?;
                    found.push((SlotFileKind::Text, Slot::new(key, parse_entries(&content))));
                }
                Some(SlotFileKind::Yaml) => {
                    let mut slots = Vec::new();
                    self.load_yaml_file(&path, &mut slots, warnings)?;
                    found.extend(slots.into_iter().map(|slot| (SlotFileKind::Yaml, slot)));
                }
                None => {}
            }
        }
        Ok(found)
    }

    fn yaml_keys(&self) -> Result<HashSet<SlotKey>, AppError> {
        Ok(self
            .file_slots(&mut Vec::new())?
            .into_iter()
            .filter(|(kind, _)| *kind == SlotFileKind::Yaml)
            .map(|(_, slot)| slot.key)
            .collect())
    }

    fn load_yaml_file(
        &self,
        path: &Path,
        out: &mut Vec<Slot>,
        warnings: &mut Vec<String>,
    ) -> Result<(), AppError> {
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(());
        }
        let document: Value = serde_yaml::from_str(&content).map_err(|e| yaml_error(path, e))?;
        let prefix = match document {
            Value::Mapping(_) => None,
            _ => match self.file_key(path) {
                Ok(key) => Some(key.to_string()),
                Err(warning) => {
                    warnings.push(warning);
                    return Ok(());
                }
            },
        };
        flatten_yaml(prefix.as_deref(), &document, path, out, warnings)
    }

    /// Stop `key` from coming back from slot files: its text files are
    /// returned for removal and a YAML definition gets a deletion marker.
    fn retire_file_slot(
        &self,
        managed: &mut ManagedSlots,
        key: &SlotKey,
        yaml_keys: &HashSet<SlotKey>,
    ) -> Result<Vec<PathBuf>, AppError> {
        if yaml_keys.contains(key) {
            managed.retain(|(existing, _)| existing != key);
            managed.push((key.clone(), None));
        }
        Ok(self
            .text_files_by_key()?
            .into_iter()
            .filter(|(file_key, _)| file_key == key)
            .map(|(_, path)| path)
            .collect())
    }
}

impl SlotStore for FilesystemSlotStore {
    fn load_registry(&self) -> Result<SlotRegistry, AppError> {
        let mut warnings = Vec::new();
        let file_slots = self.file_slots(&mut warnings)?;
        let managed = self.read_managed()?;

        let claimed: HashSet<SlotKey> = managed.iter().map(|(key, _)| key.clone()).collect();
        let mut slots: Vec<Slot> = managed
            .into_iter()
            .filter_map(|(key, lines)| {
                lines.map(|lines| Slot::new(key, lines.iter().map(|line| parse_line(line)).collect()))
            })
            .collect();
        slots.extend(
            file_slots.into_iter().map(|(_, slot)| slot).filter(|slot| !claimed.contains(&slot.key)),
        );

        *lock(&self.skipped)? = warnings;
        Ok(SlotRegistry::from_slots(slots))
    }

    fn persist_slot(&self, key: &SlotKey, raw_text: &str) -> Result<(), AppError> {
        let lines: Vec<String> = parse_entries(raw_text).iter().map(serialize_body).collect();
        let mut managed = self.read_managed()?;
        match managed.iter_mut().find(|(existing, _)| existing == key) {
            Some((_, existing)) => *existing = Some(lines),
            None => managed.push((key.clone(), Some(lines))),
        }
        self.write_managed(&managed)
    }

    fn persist_delete(&self, key: &SlotKey) -> Result<(), AppError> {
        let original = self.read_managed()?;
        let mut managed = original.clone();
        managed.retain(|(existing, _)| existing != key);
        let stale = self.retire_file_slot(&mut managed, key, &self.yaml_keys()?)?;
        if managed != original {
            self.write_managed(&managed)?;
        }
        remove_files(&stale)
    }

    fn persist_rename(&self, old_key: &SlotKey, new_key: &SlotKey) -> Result<(), AppError> {
        let current = self.load_registry()?;
        let lines: Vec<String> =
            current.get(old_key.as_str())?.entries.iter().map(serialize_body).collect();

        let mut managed = self.read_managed()?;
        managed.retain(|(existing, _)| existing != new_key);
        match managed.iter_mut().find(|(existing, _)| existing == old_key) {
            Some(entry) => *entry = (new_key.clone(), Some(lines)),
            None => managed.push((new_key.clone(), Some(lines))),
        }
        let stale = self.retire_file_slot(&mut managed, old_key, &self.yaml_keys()?)?;
        self.write_managed(&managed)?;
        remove_files(&stale)
    }

    /// The managed file takes over every slot so that it fully defines order.
    /// Text files whose slot no longer exists are removed, and YAML-defined
    /// slots that no longer exist get deletion markers.
    fn persist_order(&self, registry: &SlotRegistry) -> Result<(), AppError> {
        let mut managed: ManagedSlots = registry
            .slots()
            .iter()
            .map(|slot| (slot.key.clone(), Some(slot.entries.iter().map(serialize_body).collect())))
            .collect();
        let mut retired: Vec<SlotKey> =
            self.yaml_keys()?.into_iter().filter(|key| !registry.contains(key)).collect();
        retired.sort();
        managed.extend(retired.into_iter().map(|key| (key, None)));
        self.write_managed(&managed)?;

        let stale: Vec<PathBuf> = self
            .text_files_by_key()?
            .into_iter()
            .filter(|(file_key, _)| !registry.contains(file_key))
            .map(|(_, path)| path)
            .collect();
        remove_files(&stale)
    }
}

impl LastGeneratedStore for FilesystemSlotStore {
    fn read_last_generated(&self) -> Result<BTreeMap<SlotKey, String>, AppError> {
        let path = self.last_generated_path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_last_generated(&self, values: &BTreeMap<SlotKey, String>) -> Result<(), AppError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.last_generated_path(), serde_json::to_string_pretty(values)?)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotFileKind {
    Text,
    Yaml,
}

fn slot_extension(path: &Path) -> Option<SlotFileKind> {
    match path.extension()?.to_str()? {
        "txt" => Some(SlotFileKind::Text),
        "yaml" | "yml" => Some(SlotFileKind::Yaml),
        _ => None,
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), AppError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

fn remove_files(paths: &[PathBuf]) -> Result<(), AppError> {
    for path in paths {
        fs::remove_file(path)?;
    }
    Ok(())
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, AppError> {
    mutex.lock().map_err(|_| AppError::Io(io::Error::other("slot store lock poisoned")))
}

fn flatten_yaml(
    prefix: Option<&str>,
    value: &Value,
    path: &Path,
    out: &mut Vec<Slot>,
    warnings: &mut Vec<String>,
) -> Result<(), AppError> {
    match value {
        Value::Mapping(mapping) => {
            for (name, nested) in mapping {
                let name = scalar_text(name)
                    .ok_or_else(|| yaml_error(path, "mapping keys must be strings"))?;
                let name = normalize_key(&name);
                let key = match prefix {
                    Some(prefix) => format!("{}/{}", prefix, name),
                    None => name,
                };
                flatten_yaml(Some(&key), nested, path, out, warnings)?;
            }
            Ok(())
        }
        Value::Sequence(items) => {
            let entries = items.iter().filter_map(scalar_text).map(|item| parse_line(&item)).collect();
            push_yaml_slot(prefix, entries, path, out, warnings)
        }
        Value::Null => Ok(()),
        other => match scalar_text(other) {
            Some(text) => push_yaml_slot(prefix, vec![parse_line(&text)], path, out, warnings),
            None => Ok(()),
        },
    }
}

fn push_yaml_slot(
    prefix: Option<&str>,
    entries: Vec<ValueEntry>,
    path: &Path,
    out: &mut Vec<Slot>,
    warnings: &mut Vec<String>,
) -> Result<(), AppError> {
    let key = prefix.ok_or_else(|| yaml_error(path, "values must sit under a key"))?;
    match SlotKey::new(key) {
        Ok(key) => out.push(Slot::new(key, entries)),
        Err(_) => warnings.push(format!(
            "{}: '{}' is not a valid slot key; entry skipped",
            path.display(),
            key
        )),
    }
    Ok(())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn yaml_error(path: &Path, details: impl std::fmt::Display) -> AppError {
    AppError::YamlParseError { path: path.display().to_string(), details: details.to_string() }
}
