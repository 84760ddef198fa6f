//! Command implementations.

pub mod chat;
pub mod memory;

use hearth_kernel::config::load_config;
use hearth_memory::MemoryStore;
use std::path::Path;

/// Open the configured memory store without booting a chat session.
pub(crate) fn open_store(config_path: Option<&Path>) -> anyhow::Result<MemoryStore> {
    let config = load_config(config_path);
    Ok(hearth_kernel::open_store(&config)?)
}
