//! Session wiring for the Hearth personal assistant.
//!
//! Loads configuration, opens the memory store, registers tool collaborators,
//! builds the LLM driver, and exposes the [`Hearth`] session facade.

pub mod config;
pub mod error;
pub mod kernel;

pub use kernel::{open_store, Hearth};
