//! Configuration types. Loading lives in `hearth-kernel::config`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration, deserialized from `~/.hearth/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HearthConfig {
    /// Directory holding the database.
    pub data_dir: PathBuf,
    /// LLM backend settings.
    pub llm: LlmConfig,
    /// Agent loop settings.
    pub agent: AgentConfig,
    /// Memory store settings.
    pub memory: MemoryConfig,
}

impl Default for HearthConfig {
    fn default() -> Self {
        Self {
            data_dir: hearth_home().join("data"),
            llm: LlmConfig::default(),
            agent: AgentConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

impl HearthConfig {
    /// Full path of the SQLite database file.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.memory.db_file)
    }
}

/// LLM backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (only `anthropic` is built in).
    pub provider: String,
    /// Model identifier.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Override for the API base URL.
    pub base_url: Option<String>,
    /// Maximum tokens per response.
    pub max_tokens: u32,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: None,
            max_tokens: 4096,
            timeout_secs: 60,
        }
    }
}

/// Agent loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Session window cap, enforced at the start of each user turn.
    pub max_history_messages: usize,
    /// Tool round-trips allowed per user turn before the exchange fails.
    pub max_tool_rounds: u32,
    /// How the assistant refers to the user.
    pub user_name: Option<String>,
    /// The assistant's own name.
    pub assistant_name: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_history_messages: 40,
            max_tool_rounds: 10,
            user_name: None,
            assistant_name: "Hearth".to_string(),
        }
    }
}

/// Memory store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Database file name inside `data_dir`.
    pub db_file: String,
    /// Maximum transcript search hits.
    pub transcript_search_limit: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_file: "hearth.db".to_string(),
            transcript_search_limit: 50,
        }
    }
}

/// Hearth home directory (`~/.hearth`, or `HEARTH_HOME`).
pub fn hearth_home() -> PathBuf {
    if let Ok(home) = std::env::var("HEARTH_HOME") {
        return PathBuf::from(home);
    }
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".hearth")
}
