//! Welcome banner shown when a chat session opens.

use console::style;

/// Print the banner with model, session title, and how many turns were resumed.
pub fn print_welcome_banner(provider: &str, model: &str, title: &str, resumed_turns: usize) {
    println!();
    println!("  * {}", style("palaver").cyan().bold());
    println!("  {}", style("Chat with an LLM from your terminal").dim());
    println!();
    println!(
        "  {}     {} {}",
        style("Model:").bold(),
        style(model).dim(),
        style(format!("({provider})")).dim()
    );
    println!("  {}   {}", style("Session:").bold(), style(title).dim());
    if resumed_turns > 0 {
        println!(
            "  {}   {}",
            style("Resumed:").bold(),
            style(format!("{resumed_turns} message(s)")).dim()
        );
    }
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
}
