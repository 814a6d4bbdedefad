pub mod memory_slot_store;
pub mod rng_draw;
pub mod slot_filesystem;

pub use memory_slot_store::MemorySlotStore;
pub use rng_draw::RngDraw;
pub use slot_filesystem::FilesystemSlotStore;
