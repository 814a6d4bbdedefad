pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
mod service;
mod shared_registry;

pub use service::SlotService;
