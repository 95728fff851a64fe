//! Filety CLI - audio and video transcription
//!
//! A command-line interface for uploading recordings to Filety, tracking
//! the daily quota and managing an account.

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use filety_core::config::default_state_dir;
use filety_core::ClientConfig;

#[derive(Parser)]
#[command(name = "filety")]
#[command(author, version, about = "Transcribe audio and video with Filety", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    format: output::OutputFormat,

    /// Suppress progress messages
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Override the API base URL (or set FILETY_API_URL env var)
    #[arg(long, env = "FILETY_API_URL", global = true)]
    api_url: Option<String>,

    /// Override the state directory (or set FILETY_STATE_DIR env var)
    #[arg(long, env = "FILETY_STATE_DIR", global = true)]
    state_dir: Option<PathBuf>,

    /// Account email (or set FILETY_EMAIL env var)
    #[arg(long, env = "FILETY_EMAIL", global = true)]
    email: Option<String>,

    /// Account password (or set FILETY_PASSWORD env var)
    #[arg(long, env = "FILETY_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register,

    /// Check credentials and show the account
    Login,

    /// End the current session
    Logout,

    /// End every session of the account
    LogoutAll,

    /// Show the logged-in account
    Me,

    /// Establish or show the anonymous identity
    Anon,

    /// Show the remaining daily quota
    Usage,

    /// Upload a recording and print its transcription
    Transcribe {
        /// Audio or video file
        file: PathBuf,

        /// Write the text to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// List recent transcriptions
    Recent {
        /// Maximum number of entries
        #[arg(long, short, default_value = "10")]
        limit: usize,
    },

    /// Check that the API is reachable
    Health,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config.base_url = url.clone();
    }
    let config = config.validate()?;

    let state_dir = match &cli.state_dir {
        Some(dir) => dir.clone(),
        None => default_state_dir()?,
    };

    let credentials = match (cli.email, cli.password) {
        (Some(email), Some(password)) => Some(commands::Credentials { email, password }),
        _ => None,
    };

    // Create context for commands
    let ctx = commands::Context::new(config, state_dir, credentials, cli.format, cli.quiet)?;

    // Execute command
    match cli.command {
        Commands::Register => commands::account::register(&ctx).await,
        Commands::Login => commands::account::login(&ctx).await,
        Commands::Logout => commands::account::logout(&ctx).await,
        Commands::LogoutAll => commands::account::logout_all(&ctx).await,
        Commands::Me => commands::account::me(&ctx).await,
        Commands::Anon => commands::usage::anon(&ctx).await,
        Commands::Usage => commands::usage::usage(&ctx).await,
        Commands::Transcribe { file, output } => {
            commands::transcribe::transcribe(&ctx, file, output).await
        }
        Commands::Recent { limit } => commands::transcribe::recent(&ctx, limit).await,
        Commands::Health => commands::health::execute(&ctx).await,
        Commands::Config { action } => commands::config::execute(&ctx, action).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use output::OutputFormat;

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["filety", "health", "--format", "json", "-q"]).unwrap();
        assert!(matches!(cli.command, Commands::Health));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.quiet);
    }

    #[test]
    fn test_format_defaults_to_table() {
        let cli = Cli::try_parse_from(["filety", "usage"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Table);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let err = Cli::try_parse_from(["filety", "usage", "--format", "yaml"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_transcribe_arguments() {
        let cli = Cli::try_parse_from(["filety", "transcribe", "talk.mp4", "-o", "talk.txt"]).unwrap();
        match cli.command {
            Commands::Transcribe { file, output } => {
                assert_eq!(file, PathBuf::from("talk.mp4"));
                assert_eq!(output, Some(PathBuf::from("talk.txt")));
            }
            _ => panic!("expected transcribe"),
        }
    }

    #[test]
    fn test_recent_limit_default() {
        let cli = Cli::try_parse_from(["filety", "recent"]).unwrap();
        assert!(matches!(cli.command, Commands::Recent { limit: 10 }));
    }
}
