//! Recall CLI
//!
//! Main entry point for the recall command-line tool.
//! Answers questions from a local question/answer knowledge base.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AddCommand, AskCommand, CleanCommand, ImportCommand, ListCommand, StatsCommand};
use recall_core::{config::AppConfig, logging, AppError};
use std::path::PathBuf;
use tracing::Instrument;

/// Recall - answer questions from your own question/answer pairs
#[derive(Parser, Debug)]
#[command(name = "recall")]
#[command(about = "Semantic question/answer retrieval", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "RECALL_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "RECALL_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Embedding provider (trigram, ollama, mock)
    #[arg(short, long, global = true, env = "RECALL_PROVIDER")]
    provider: Option<String>,

    /// Embedding model identifier
    #[arg(short, long, global = true, env = "RECALL_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add one question/answer pair
    Add(AddCommand),

    /// Import question/answer pairs from a JSON file
    Import(ImportCommand),

    /// Answer a question from the knowledge base
    Ask(AskCommand),

    /// List the question/answer pairs
    List(ListCommand),

    /// Show knowledge base statistics
    Stats(StatsCommand),

    /// Remove every pair from the knowledge base
    Clean(CleanCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from the workspace config file and environment
    let config = AppConfig::load_for(cli.workspace.clone(), cli.config.clone())?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );
    config.validate()?;

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_format)?;

    tracing::info!("Recall CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    // Ensure .recall directory exists
    config.ensure_data_dir()?;

    let command_name = match &cli.command {
        Commands::Add(_) => "add",
        Commands::Import(_) => "import",
        Commands::Ask(_) => "ask",
        Commands::List(_) => "list",
        Commands::Stats(_) => "stats",
        Commands::Clean(_) => "clean",
    };
    let span = tracing::info_span!("command", name = command_name);

    // Route to command handlers
    let result = run(cli.command, &config).instrument(span).await;

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => match e.downcast_ref::<AppError>() {
            Some(app) if app.is_fatal() => {
                tracing::error!("Knowledge base unavailable: {}", app)
            }
            _ => tracing::error!("Command failed: {:#}", e),
        },
    }

    result
}

async fn run(command: Commands, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::Add(cmd) => cmd.execute(config).await?,
        Commands::Import(cmd) => cmd.execute(config).await?,
        Commands::Ask(cmd) => cmd.execute(config).await?,
        Commands::List(cmd) => cmd.execute(config).await?,
        Commands::Stats(cmd) => cmd.execute(config).await?,
        Commands::Clean(cmd) => cmd.execute(config).await?,
    }
    Ok(())
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
    fn test_parse_ask_with_top_k() {
        let cli = Cli::try_parse_from(["recall", "ask", "What is Rust?", "-k", "3", "--json"]).unwrap();
        match cli.command {
            Commands::Ask(cmd) => {
                assert_eq!(cmd.query, "What is Rust?");
                assert_eq!(cmd.top_k, 3);
                assert!(cmd.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_ask_default_top_k() {
        let cli = Cli::try_parse_from(["recall", "ask", "q"]).unwrap();
        match cli.command {
            Commands::Ask(cmd) => assert_eq!(cmd.top_k, 1),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_add_requires_answer() {
        assert!(Cli::try_parse_from(["recall", "add", "question only"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["recall", "list", "--provider", "mock", "-w", "/tmp"]).unwrap();
        assert_eq!(cli.provider.as_deref(), Some("mock"));
        assert_eq!(cli.workspace, Some(PathBuf::from("/tmp")));
    }
}
