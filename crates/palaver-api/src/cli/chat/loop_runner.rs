//! Main chat loop orchestration.
//!
//! Picks or resumes a session, replays its transcript, then reads lines and
//! runs one streamed round-trip per message until the user exits.

use std::time::{Duration, Instant};

use anyhow::Context;
use console::style;
use crossterm::style::Color;
use dialoguer::Select;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use palaver_core::chat::session::ChatSession;
use palaver_types::chat::{SessionId, SubmitStatus};

use crate::cli::session::print_transcript;
use crate::state::{AppState, ConcreteChatService};

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;

/// Run the interactive chat loop.
///
/// `resume` opens a stored session; `new` skips the picker. With neither,
/// the user picks from "New Chat" and the saved sessions.
pub async fn run_chat_loop(
    state: &AppState,
    resume: Option<String>,
    new: bool,
    model: Option<String>,
) -> anyhow::Result<()> {
    let service = state.chat_service(model.as_deref())?;
    let renderer = ChatRenderer::new(Some(Color::Cyan));

    let Some(id) = choose_session(&service, resume, new).await? else {
        return Ok(());
    };
    let mut session = service.begin_session(id).await?;
    open_session(&service, &session, &renderer);

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }

                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => commands::print_help(),
                        ChatCommand::Clear => chat_input.clear(),
                        ChatCommand::Exit => {
                            println!("\n  {}", style("Session ended.").dim());
                            break;
                        }
                        ChatCommand::New => {
                            session = service.new_session().await?;
                            open_session(&service, &session, &renderer);
                        }
                        ChatCommand::History => {
                            if session.messages().is_empty() {
                                println!("\n  {}\n", style("No messages yet.").dim());
                            } else {
                                print_transcript(&renderer, session.messages());
                            }
                        }
                        ChatCommand::Info => {
                            println!();
                            println!("  {}  {}", style("Session:").bold(), session.id());
                            println!("  {}    {}", style("Title:").bold(), session.title());
                            println!(
                                "  {} {}",
                                style("Messages:").bold(),
                                session.messages().len()
                            );
                            println!();
                        }
                        ChatCommand::Unknown(name) => {
                            println!(
                                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                                style("?").yellow().bold(),
                                style(name).dim()
                            );
                        }
                    }
                    continue;
                }

                if let Err(e) = round_trip(&service, &mut session, &text, &renderer).await {
                    warn!(session_id = %session.id(), error = %e, "Round-trip failed");
                    eprintln!("\n  {} {e:#}\n", style("!").red().bold());
                }
            }
        }
    }

    chat_input.flush();
    info!(
        session_id = %session.id(),
        exchanges = session.exchange_count(),
        "Chat loop finished"
    );
    Ok(())
}

/// Resolve which session to open. `None` means the user backed out.
async fn choose_session(
    service: &ConcreteChatService,
    resume: Option<String>,
    new: bool,
) -> anyhow::Result<Option<SessionId>> {
    let index = service.list_sessions().await?;

    if let Some(raw) = resume {
        let id = SessionId::parse(&raw)?;
        if !index.contains(&id) {
            anyhow::bail!(
                "session '{id}' not found; run `palaver sessions` to list saved sessions"
            );
        }
        return Ok(Some(id));
    }

    if new || index.is_empty() || !console::user_attended() {
        return Ok(Some(SessionId::generate()));
    }

    let past: Vec<(&SessionId, String)> = index
        .iter()
        .rev()
        .map(|(id, title)| (id, title.to_string()))
        .collect();
    let mut items = vec!["New Chat".to_string()];
    items.extend(past.iter().map(|(_, title)| title.clone()));

    let selection = Select::new()
        .with_prompt("Choose a chat")
        .items(&items)
        .default(0)
        .interact_opt()
        .context("failed to read session choice")?;

    Ok(match selection {
        None => None,
        Some(0) => Some(SessionId::generate()),
        Some(i) => past.get(i - 1).map(|(id, _)| (*id).clone()),
    })
}

/// Print the banner and replay any stored turns.
fn open_session(service: &ConcreteChatService, session: &ChatSession, renderer: &ChatRenderer) {
    print_welcome_banner(
        service.provider_name(),
        &service.settings().model,
        session.title().as_str(),
        session.messages().len(),
    );
    if session.messages().is_empty() {
        println!();
    } else {
        print_transcript(renderer, session.messages());
    }
}

/// Submit one message, streaming fragments to the terminal as they arrive.
async fn round_trip(
    service: &ConcreteChatService,
    session: &mut ChatSession,
    text: &str,
    renderer: &ChatRenderer,
) -> anyhow::Result<()> {
    let spinner = thinking_spinner()?;
    let started = Instant::now();
    let mut fragments = 0usize;

    let result = service
        .submit(session, text, |fragment| {
            if fragments == 0 {
                spinner.finish_and_clear();
                print!("\n  ");
            }
            fragments += 1;
            renderer.print_streaming_fragment(fragment);
        })
        .await;
    spinner.finish_and_clear();
    let outcome = result?;

    match outcome.status {
        SubmitStatus::Completed => {
            println!();
            renderer.print_stats_footer(fragments, started.elapsed(), &service.settings().model);
        }
        SubmitStatus::EmptyResponse => {
            println!("\n  {} {}", style("!").yellow().bold(), outcome.reply.text);
        }
        SubmitStatus::Failed { .. } => {
            if fragments > 0 {
                println!();
            }
            println!("\n  {} {}", style("!").red().bold(), outcome.reply.text);
        }
    }
    println!();
    Ok(())
}

fn thinking_spinner() -> anyhow::Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    Ok(spinner)
}
