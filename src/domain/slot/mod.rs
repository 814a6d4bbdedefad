mod entry;
pub mod parser;

pub use entry::{Slot, ValueEntry};
pub use parser::{parse_entries, parse_line, serialize_body, serialize_entries};
