//! Interactive chat REPL.

use crate::ui;
use hearth_kernel::config::load_config;
use hearth_kernel::Hearth;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};

/// What the REPL should do with one input line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ChatInput<'a> {
    Skip,
    Quit,
    Reset,
    Message(&'a str),
}

pub(crate) fn classify(line: &str) -> ChatInput<'_> {
    match line.trim() {
        "" => ChatInput::Skip,
        "/quit" | "/exit" => ChatInput::Quit,
        "/reset" | "/new" => ChatInput::Reset,
        text => ChatInput::Message(text),
    }
}

pub fn cmd_chat(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config_path.as_deref());
    let key_env = config.llm.api_key_env.clone();
    let hearth = match Hearth::boot(config) {
        Ok(hearth) => hearth,
        Err(e) => {
            ui::error_with_fix(
                &e.to_string(),
                &format!("export {key_env}=<your API key> (or set [llm] in ~/.hearth/config.toml)"),
            );
            std::process::exit(1);
        }
    };
    let name = hearth.config().agent.assistant_name.clone();
    info!(assistant = %name, tools = hearth.tools().len(), "Chat session started");
    let rt = tokio::runtime::Runtime::new()?;

    ui::banner(&name);
    ui::blank();

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("{}", ui::prompt());
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match classify(&line) {
            ChatInput::Skip => continue,
            ChatInput::Quit => break,
            ChatInput::Reset => {
                rt.block_on(hearth.reset_session());
                debug!("Conversation reset from REPL");
                ui::success("Started a new conversation.");
            }
            ChatInput::Message(text) => {
                let reply = rt.block_on(hearth.send_message(text));
                ui::reply(&name, &reply);
                ui::blank();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_input() {
        assert_eq!(classify("  \n"), ChatInput::Skip);
        assert_eq!(classify("/quit\n"), ChatInput::Quit);
        assert_eq!(classify("/reset"), ChatInput::Reset);
        assert_eq!(
            classify("  remind me to call mom \n"),
            ChatInput::Message("remind me to call mom")
        );
        assert_eq!(classify("/unknown"), ChatInput::Message("/unknown"));
    }
}
