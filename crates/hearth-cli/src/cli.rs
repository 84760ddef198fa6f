//! Clap CLI definitions for Hearth.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const AFTER_HELP: &str = "\
\x1b[1;36mExamples:\x1b[0m
  hearth chat                   Talk to your assistant
  hearth memories               Show what Hearth remembers about you
  hearth memories --all         Include facts replaced by corrections
  hearth search dentist         Search past conversations
  hearth forget 12              Permanently forget memory #12

\x1b[1;36mSetup:\x1b[0m
  export ANTHROPIC_API_KEY=...  API key (variable name set by [llm].api_key_env)
  ~/.hearth/config.toml         Optional configuration";

/// Hearth, a personal assistant that remembers.
#[derive(Parser)]
#[command(
    name = "hearth",
    version,
    about = "Hearth \u{00b7} a personal assistant that remembers",
    after_help = AFTER_HELP,
)]
pub struct Cli {
    /// Path to config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive chat (default). `/reset` starts a new conversation, `/quit` exits.
    Chat,
    /// List remembered facts.
    Memories {
        /// Include facts retired by a correction.
        #[arg(long)]
        all: bool,
        /// Only facts filed under this subject.
        #[arg(long)]
        subject: Option<String>,
    },
    /// List the people and things memories are filed under.
    Subjects,
    /// Full-text search over past conversations.
    Search {
        /// Words to look for.
        #[arg(required = true)]
        query: Vec<String>,
        /// Maximum hits to show.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Show the correction history of a memory.
    History {
        /// Memory id.
        id: i64,
    },
    /// Permanently delete a memory.
    Forget {
        /// Memory id.
        id: i64,
    },
    /// List recent conversations.
    Conversations {
        /// Maximum conversations to show.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}
