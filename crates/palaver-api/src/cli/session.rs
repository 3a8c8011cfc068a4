//! Session browsing commands: list, show, export, delete.
//!
//! These only read and remove stored records, so they never need an API key.

use anyhow::Context;
use chrono::{DateTime, Local, Utc};
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use dialoguer::Confirm;

use palaver_core::chat::catalog;
use palaver_core::chat::repository::ChatRepository;
use palaver_types::chat::{Role, SessionId, Turn};

use crate::cli::chat::renderer::ChatRenderer;
use crate::cli::ExportFormat;
use crate::state::AppState;

/// List every saved session, newest first.
pub async fn list_sessions(state: &AppState, json: bool) -> anyhow::Result<()> {
    let index = catalog::list_sessions(&state.repo).await?;

    if json {
        let sessions: Vec<serde_json::Value> = index
            .iter()
            .rev()
            .map(|(id, title)| {
                serde_json::json!({
                    "id": id.as_str(),
                    "title": title.as_str(),
                    "started_at": id.created_at().map(|t| t.to_rfc3339()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if index.is_empty() {
        println!();
        println!(
            "  {} No saved sessions yet. Start one with: {}",
            style("i").cyan().bold(),
            style("palaver chat").cyan()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Started").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
    ]);

    for (id, title) in index.iter().rev() {
        let message_count = match state.repo.load_messages(id).await {
            Ok(messages) => Cell::new(messages.len().to_string()).fg(Color::White),
            Err(e) => {
                tracing::warn!(session_id = %id, error = %e, "Could not read messages");
                Cell::new("?").fg(Color::Red)
            }
        };

        table.add_row(vec![
            Cell::new(id.as_str()).fg(Color::DarkGrey),
            Cell::new(title.as_str()).fg(Color::Cyan),
            Cell::new(format_started(id.created_at())).fg(Color::White),
            message_count,
        ]);
    }

    println!("{table}");
    println!(
        "  {}",
        style(format!("{} session(s)", index.len())).dim()
    );
    Ok(())
}

/// Print a session's transcript with markdown rendering.
pub async fn show_session(state: &AppState, id: &str, json: bool) -> anyhow::Result<()> {
    let id = SessionId::parse(id)?;
    let (title, messages) = catalog::load_transcript(&state.repo, &id).await?;

    if json {
        let detail = serde_json::json!({
            "id": id.as_str(),
            "title": title.as_str(),
            "started_at": id.created_at().map(|t| t.to_rfc3339()),
            "messages": messages,
        });
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(title.as_str()).cyan().bold());
    println!(
        "  {}  {}",
        style("Started:").bold(),
        style(format_started(id.created_at())).dim()
    );
    println!(
        "  {}  {}",
        style("Messages:").bold(),
        style(messages.len()).dim()
    );
    println!("  {}", style("---").dim());

    let renderer = ChatRenderer::new(None);
    print_transcript(&renderer, &messages);
    Ok(())
}

/// Write a session's transcript to stdout as Markdown or JSON.
pub async fn export_session(
    state: &AppState,
    id: &str,
    format: ExportFormat,
) -> anyhow::Result<()> {
    let id = SessionId::parse(id)?;
    let (title, messages) = catalog::load_transcript(&state.repo, &id).await?;

    let output = match format {
        ExportFormat::Markdown => export_markdown(title.as_str(), id.created_at(), &messages),
        ExportFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
            "id": id.as_str(),
            "title": title.as_str(),
            "started_at": id.created_at().map(|t| t.to_rfc3339()),
            "messages": messages,
        }))?,
    };
    println!("{output}");
    Ok(())
}

/// Delete a session after confirmation.
pub async fn delete_session(
    state: &AppState,
    id: &str,
    force: bool,
    json: bool,
) -> anyhow::Result<()> {
    let id = SessionId::parse(id)?;
    let (title, messages) = catalog::load_transcript(&state.repo, &id).await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete session '{}' ({} messages)?",
                style(title.as_str()).red().bold(),
                messages.len()
            ))
            .default(false)
            .interact()
            .context("failed to read confirmation")?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    catalog::delete_session(&state.repo, &id).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "deleted": true,
                "id": id.as_str(),
                "title": title.as_str(),
            }))?
        );
    } else {
        println!();
        println!(
            "  {} Session '{}' deleted.",
            style("✓").green().bold(),
            style(title.as_str()).bold()
        );
        println!();
    }
    Ok(())
}

/// Print every turn, rendering assistant replies as markdown.
pub fn print_transcript(renderer: &ChatRenderer, messages: &[Turn]) {
    for turn in messages {
        println!();
        match turn.role {
            Role::User => {
                println!("  {} {}", style("You >").green().bold(), turn.text);
            }
            Role::Assistant => {
                println!("  {}", style("AI >").cyan().bold());
                println!("  {}", renderer.render_final(&turn.text).trim());
            }
        }
    }
    println!();
}

fn export_markdown(title: &str, started: Option<DateTime<Utc>>, messages: &[Turn]) -> String {
    let mut md = format!("# {title}\n\n");
    if let Some(started) = started {
        md.push_str(&format!("*Started {}*\n\n", started.to_rfc3339()));
    }
    for turn in messages {
        let speaker = match turn.role {
            Role::User => "You",
            Role::Assistant => "AI",
        };
        md.push_str(&format!("### **{speaker}**\n\n{}\n\n", turn.text));
    }
    md
}

fn format_started(started: Option<DateTime<Utc>>) -> String {
    started
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}
