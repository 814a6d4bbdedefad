mod draw;
mod slot_store;

pub use draw::Draw;
pub use slot_store::{LastGeneratedStore, SlotStore};
