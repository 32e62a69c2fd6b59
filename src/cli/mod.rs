//! CLI adapter for mailbulk
//!
//! Provides the command-line interface over `core/`. Commands parse
//! their own arguments, call into the core and render the result as
//! human-readable text or JSON.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

/// mailbulk - Bulk-load maildir email corpora into a search index
///
/// Walks `<dataset>/<owner>/<folder>/<file>`, normalizes every message
/// and ships the documents to the cluster's `_bulk` endpoint in fixed
/// size batches, with refresh disabled during the load.
#[derive(Parser, Debug)]
#[command(name = "mailbulk")]
#[command(version)]
#[command(about = "Bulk-load email corpora into Elasticsearch", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a maildir dataset into the configured index
    Load(commands::LoadArgs),

    /// Show the effective configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  mailbulk completions bash > ~/.local/share/bash-completion/completions/mailbulk
    ///   zsh:   mailbulk completions zsh > ~/.zfunc/_mailbulk
    ///   fish:  mailbulk completions fish > ~/.config/fish/completions/mailbulk.fish
    Completions(commands::CompletionsArgs),
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Completions(args) => commands::completions::execute(args),
        Commands::ShowConfig(args) => commands::config::execute(args, cli.format),
        Commands::Load(args) => commands::load::execute(args, cli.format).await.map(|_| ()),
    }
}
