//! Agent runtime for the Hearth personal assistant.
//!
//! - [`llm_driver`]: the backend abstraction and its request/response types.
//! - [`drivers`]: concrete backends (Anthropic Messages API).
//! - [`tool_catalog`]: the read-only tool descriptors advertised to the model.
//! - [`tool_runner`]: the registry and dispatcher that turns tool calls into result text.
//! - [`memory_tools`]: tools served directly from the memory store.
//! - [`agent_loop`]: the conversation orchestrator.

pub mod agent_loop;
pub mod drivers;
pub mod llm_driver;
pub mod memory_tools;
pub mod prompt_builder;
pub mod tool_catalog;
pub mod tool_runner;
