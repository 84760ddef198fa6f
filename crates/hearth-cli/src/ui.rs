//! Shared terminal output helpers.

use colored::Colorize;

/// Brand banner shown when chat starts.
pub fn banner(assistant_name: &str) {
    println!("  {} {}", ">>".bright_cyan().bold(), assistant_name.bold());
    println!(
        "     {}",
        "Type a message. /reset starts over, /quit exits.".dimmed()
    );
}

/// Section header: ">> Title" in cyan.
pub fn section(title: &str) {
    println!("  {} {}", ">>".bright_cyan().bold(), title.bold());
}

/// Print a success message.
pub fn success(msg: &str) {
    println!("  {} {}", "\u{2714}".bright_green(), msg);
}

/// Red error + yellow "fix:" suggestion.
pub fn error_with_fix(msg: &str, fix: &str) {
    eprintln!("  {} {}", "\u{2718}".bright_red(), msg.bright_red());
    eprintln!("    {} {}", "fix:".bright_yellow(), fix);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("  {} {}", "\u{2718}".bright_red(), msg.bright_red());
}

/// Hint line: "  hint: message" in dimmed text.
pub fn hint(msg: &str) {
    println!("  {} {}", "hint:".dimmed(), msg.dimmed());
}

/// The chat input prompt.
pub fn prompt() -> String {
    format!("{} ", "you>".bright_green().bold())
}

/// An assistant reply; error replies are shown in red.
pub fn reply(name: &str, text: &str) {
    let label = format!("{}>", name.to_lowercase());
    if text.starts_with("Error:") {
        println!("{} {}", label.bright_cyan().bold(), text.bright_red());
    } else {
        println!("{} {}", label.bright_cyan().bold(), text);
    }
}

/// Empty line.
pub fn blank() {
    println!();
}
