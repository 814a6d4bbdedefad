pub mod condition;
pub mod config;
pub mod error;
pub mod identifiers;
pub mod registry;
pub mod resolver;
pub mod selection;
pub mod similarity;
pub mod slot;

pub use condition::{ConditionContext, ConditionEvaluator, PatternConditions};
pub use config::{ResolverConfig, StoreConfig, WildslotConfig};
pub use error::AppError;
pub use identifiers::{MANAGED_PREFIX, SlotKey};
pub use registry::{GroupPosition, MoveMode, MoveOutcome, MoveTarget, SlotRegistry};
pub use resolver::{ResolveWarning, ResolvedPrompt, Resolver, ResolverOptions};
pub use selection::{Selection, SelectionState, TEMPLATE_KEY};
pub use similarity::find_similar_value;
pub use slot::{Slot, ValueEntry, parse_entries, serialize_entries};
