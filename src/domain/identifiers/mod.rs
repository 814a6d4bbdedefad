pub mod slot_key;
pub mod validation;

pub use slot_key::{MANAGED_PREFIX, SlotKey, validate_group};
pub use validation::normalize_key;
