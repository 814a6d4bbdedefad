//! Locating `wildslot.toml` and the slot root.
//!
//! Schema parsing lives in `domain::config`; this module only decides which
//! file to read and how the root directory is chosen.

mod load_config;

pub use load_config::{LoadedConfig, load_config, resolve_root};
