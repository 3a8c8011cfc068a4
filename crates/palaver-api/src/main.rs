//! Palaver CLI entry point.
//!
//! Binary name: `palaver`
//!
//! Loads `.env`, parses CLI arguments, sets up tracing, then dispatches to
//! the chat loop or one of the session browsing commands.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use palaver_observe::tracing_setup::{filter_for_verbosity, init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // API keys may live in a local .env file
    let dotenv_path = dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let enable_otel = std::env::var("PALAVER_OTEL").is_ok_and(|v| v == "1");
    init_tracing(filter_for_verbosity(cli.quiet, cli.verbose), enable_otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;
    if let Some(path) = dotenv_path {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "palaver", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;

    let result = match cli.command {
        Commands::Chat { resume, new, model } => {
            cli::chat::loop_runner::run_chat_loop(&state, resume, new, model).await
        }
        Commands::Sessions => cli::session::list_sessions(&state, cli.json).await,
        Commands::Show { id } => cli::session::show_session(&state, &id, cli.json).await,
        Commands::Export { id, format } => {
            cli::session::export_session(&state, &id, format).await
        }
        Commands::Delete { id, force } => {
            cli::session::delete_session(&state, &id, force, cli.json).await
        }
        Commands::Completions { .. } => Ok(()),
    };

    shutdown_tracing();
    result
}
