//! Configuration domain models.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::{DEFAULT_LAST_GENERATED_FILE, DEFAULT_MANAGED_FILE};
use crate::domain::resolver::{DEFAULT_MAX_DEPTH, DEFAULT_SEPARATOR, ResolverOptions};
use crate::domain::selection::TEMPLATE_KEY;
use crate::domain::{AppError, SlotKey};

/// Configuration loaded from `wildslot.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WildslotConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

impl WildslotConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        self.store.validate()?;
        self.resolver.validate()?;
        Ok(())
    }
}

/// Where slots live on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Slot directory; relative paths resolve against the working directory.
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// YAML file (inside the root) holding slots written through the tool.
    #[serde(default = "default_managed_file")]
    pub managed_file: String,
    /// JSON file (inside the root) recording the latest resolution's choices.
    #[serde(default = "default_last_generated_file")]
    pub last_generated_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: None,
            managed_file: default_managed_file(),
            last_generated_file: default_last_generated_file(),
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_file_name("managed_file", &self.managed_file)?;
        if !(self.managed_file.ends_with(".yaml") || self.managed_file.ends_with(".yml")) {
            return Err(AppError::config_error(format!(
                "managed_file must be a .yaml or .yml file, got '{}'",
                self.managed_file
            )));
        }
        validate_file_name("last_generated_file", &self.last_generated_file)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Joins successive results when several templates are resolved at once.
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Slot expanded by `generate`.
    #[serde(default = "default_template_key")]
    pub template_key: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            separator: default_separator(),
            template_key: default_template_key(),
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_depth == 0 {
            return Err(AppError::config_error("max_depth must be greater than 0"));
        }
        SlotKey::new(&self.template_key).map_err(|_| {
            AppError::config_error(format!("template_key '{}' is not a valid slot key", self.template_key))
        })?;
        Ok(())
    }

    pub fn options(&self) -> ResolverOptions {
        ResolverOptions { max_depth: self.max_depth, template_key: self.template_key.clone() }
    }
}

fn validate_file_name(field: &str, name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::config_error(format!("{} cannot be empty", field)));
    }
    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(AppError::config_error(format!(
            "{} must be a plain file name, got '{}'",
            field, name
        )));
    }
    Ok(())
}

fn default_managed_file() -> String {
    DEFAULT_MANAGED_FILE.to_string()
}

fn default_last_generated_file() -> String {
    DEFAULT_LAST_GENERATED_FILE.to_string()
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

fn default_template_key() -> String {
    TEMPLATE_KEY.to_string()
}
