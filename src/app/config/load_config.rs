use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::config;
use crate::domain::{AppError, WildslotConfig};

/// A parsed configuration and the directory it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: WildslotConfig,
    /// Base for relative paths inside the file.
    pub dir: PathBuf,
}

/// Load `explicit`, or `<cwd>/wildslot.toml` when no path is given.
///
/// A missing default file yields the defaults; a missing explicit file is an error.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<LoadedConfig, AppError> {
    let (path, required) = match explicit {
        Some(path) => (cwd.join(path), true),
        None => (config::paths::config(cwd), false),
    };

    if !path.is_file() {
        if required {
            return Err(AppError::config_error(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok(LoadedConfig { config: WildslotConfig::default(), dir: cwd.to_path_buf() });
    }

    let content = fs::read_to_string(&path)?;
    let config = config::parse::parse_config_content(&content)?;
    let dir = path.parent().map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);
    Ok(LoadedConfig { config, dir })
}

/// Slot root precedence: `--root`, then `WILDSLOT_ROOT`, then `store.root`
/// (relative to the config file), then the working directory.
pub fn resolve_root(
    cli_root: Option<&Path>,
    env_root: Option<&str>,
    loaded: &LoadedConfig,
    cwd: &Path,
) -> PathBuf {
    if let Some(root) = cli_root {
        return cwd.join(root);
    }
    if let Some(root) = env_root.filter(|root| !root.trim().is_empty()) {
        return cwd.join(root);
    }
    if let Some(root) = &loaded.config.store.root {
        return loaded.dir.join(root);
    }
    cwd.to_path_buf()
}
