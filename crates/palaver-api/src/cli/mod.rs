//! CLI command definitions for the `palaver` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod session;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Chat with an LLM from your terminal; every conversation is saved and resumable.
#[derive(Parser)]
#[command(name = "palaver", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start or resume an interactive chat.
    Chat {
        /// Resume a previous session by ID.
        #[arg(long, conflicts_with = "new")]
        resume: Option<String>,

        /// Start a new session without showing the session picker.
        #[arg(long)]
        new: bool,

        /// Override the model from config.toml.
        #[arg(long, short)]
        model: Option<String>,
    },

    /// List saved sessions.
    #[command(alias = "ls")]
    Sessions,

    /// Print the transcript of a session.
    Show {
        /// Session ID.
        id: String,
    },

    /// Export a session transcript.
    Export {
        /// Session ID.
        id: String,

        /// Output format.
        #[arg(long, value_enum, default_value_t = ExportFormat::Markdown)]
        format: ExportFormat,
    },

    /// Delete a session and its saved history.
    #[command(alias = "rm")]
    Delete {
        /// Session ID.
        id: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Markdown,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_chat_resume() {
        let cli = Cli::try_parse_from(["palaver", "chat", "--resume", "1718000000.000001"]).unwrap();
        match cli.command {
            Commands::Chat { resume, new, model } => {
                assert_eq!(resume.as_deref(), Some("1718000000.000001"));
                assert!(!new);
                assert!(model.is_none());
            }
            _ => panic!("expected chat command"),
        }
    }

    #[test]
    fn test_resume_conflicts_with_new() {
        assert!(Cli::try_parse_from(["palaver", "chat", "--resume", "x", "--new"]).is_err());
    }

    #[test]
    fn test_parse_export_json_with_global_flags() {
        let cli = Cli::try_parse_from(["palaver", "export", "s1", "--format", "json", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Export {
                format: ExportFormat::Json,
                ..
            }
        ));
    }
}
