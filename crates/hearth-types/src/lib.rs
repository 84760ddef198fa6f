//! Core types for the Hearth personal assistant.
//!
//! This crate defines the shared data structures used by the memory store,
//! the agent runtime, and the kernel. It contains no business logic.

pub mod config;
pub mod error;
pub mod memory;
pub mod message;
pub mod tool;
