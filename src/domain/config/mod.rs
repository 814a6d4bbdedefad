pub mod parse;
pub mod paths;
pub mod wildslot_config;

pub use parse::parse_config_content;
pub use wildslot_config::{ResolverConfig, StoreConfig, WildslotConfig};
