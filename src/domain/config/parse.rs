//! Pure parse/validate for `wildslot.toml`.

use crate::domain::{AppError, WildslotConfig};

/// Parse and validate configuration from TOML content.
pub fn parse_config_content(content: &str) -> Result<WildslotConfig, AppError> {
    let config: WildslotConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}
