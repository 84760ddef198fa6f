//! Hearth CLI: interactive chat plus a few memory store inspection commands.
//!
//! Inspection commands only open the database; `chat` also needs an API key.

mod cli;
mod cmd;
mod table;
mod ui;

use crate::cli::*;
use clap::Parser;

/// Log to stderr, filtered by `RUST_LOG` or `default_filter`.
fn init_tracing_stderr(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Chat);

    // Info-level logs would interleave with the chat transcript.
    if matches!(command, Commands::Chat) {
        init_tracing_stderr("warn");
    } else {
        init_tracing_stderr("info");
    }

    let config = cli.config.as_deref();
    let result = match command {
        Commands::Chat => cmd::chat::cmd_chat(cli.config.clone()),
        Commands::Memories { all, subject } => {
            cmd::memory::cmd_memories(config, all, subject.as_deref())
        }
        Commands::Subjects => cmd::memory::cmd_subjects(config),
        Commands::Search { query, limit } => {
            cmd::memory::cmd_search(config, &query.join(" "), limit)
        }
        Commands::History { id } => cmd::memory::cmd_history(config, id),
        Commands::Forget { id } => cmd::memory::cmd_forget(config, id),
        Commands::Conversations { limit } => cmd::memory::cmd_conversations(config, limit),
    };

    if let Err(e) = result {
        ui::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
