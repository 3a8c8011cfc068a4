//! Slash command parsing for the chat loop.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Exit the chat session.
    Exit,
    /// Switch to a fresh session.
    New,
    /// Reprint this session's conversation.
    History,
    /// Print the current session's id and title.
    Info,
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/new" => Some(ChatCommand::New),
        "/history" => Some(ChatCommand::History),
        "/info" | "/session" => Some(ChatCommand::Info),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}    Show this help message", style("/help").cyan());
    println!("  {}   Clear the screen", style("/clear").cyan());
    println!("  {}    End the chat session", style("/exit").cyan());
    println!("  {}     Start a new session", style("/new").cyan());
    println!("  {} Show conversation history", style("/history").cyan());
    println!("  {}    Show the current session id", style("/info").cyan());
    println!();
    println!(
        "  {}",
        style("Ctrl+D to exit. Every reply is saved as soon as it finishes.").dim()
    );
    println!();
}
