//! Well-known file names under a slot root.

use std::path::{Path, PathBuf};

/// Configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "wildslot.toml";

/// Environment variable overriding the configured store root.
pub const ROOT_ENV: &str = "WILDSLOT_ROOT";

pub const DEFAULT_MANAGED_FILE: &str = "slots.yaml";
pub const DEFAULT_LAST_GENERATED_FILE: &str = "last_generated.json";

/// `<dir>/wildslot.toml`
pub fn config(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}
