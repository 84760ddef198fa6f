//! System prompt assembly.
//!
//! The prompt is rebuilt before every backend call: static instructions, the
//! current local time, then whatever the memory store renders.

use chrono::{DateTime, Local};
use hearth_types::config::AgentConfig;

/// Build the system prompt for one backend call.
pub fn build_system_prompt(
    agent: &AgentConfig,
    now: DateTime<Local>,
    memory_block: &str,
) -> String {
    let mut prompt = format!(
        "You are {}, a personal assistant running on the user's own device.",
        agent.assistant_name
    );
    if let Some(user) = agent.user_name.as_deref().filter(|u| !u.trim().is_empty()) {
        prompt.push_str(&format!(" You are helping {user}."));
    }
    prompt.push_str(&format!(
        "\nThe current local date and time is {}.",
        now.format("%A, %B %-d, %Y %H:%M (%:z)")
    ));
    prompt.push_str(GUIDELINES);

    if !memory_block.trim().is_empty() {
        prompt.push_str("\n\n");
        prompt.push_str(memory_block.trim_end());
    }
    prompt
}

const GUIDELINES: &str = "

## Guidelines
- Answer briefly and conversationally.
- Use the calendar, reminders, contacts, mail, and location tools to act on the user's behalf; never invent their results.
- When the user tells you something worth remembering, save it with memory_save. Pick the closest category and set subject to the people it concerns.
- When a remembered fact changes, use memory_correct with its [#id] instead of saving a duplicate.
- When the user restates a fact you already know, use memory_confirm with its [#id].
- Only use memory_forget when the user asks you to forget something.
- Facts marked (uncertain) were inferred; confirm them before relying on them.
- If a tool returns an error, explain the problem plainly or try a different approach.";
