//! mailbulk - bulk-load maildir email corpora into a search index
//!
//! # Examples
//!
//! ```bash
//! # Load ./maildir into the index named in mailbulk.toml
//! mailbulk load --config mailbulk.toml --dataset maildir
//!
//! # Exercise the whole pipeline without a cluster
//! mailbulk load --dataset maildir --dry-run
//!
//! # Show the effective configuration
//! mailbulk show-config
//! ```

use clap::Parser;
use mailbulk::cli::output::print_error;
use mailbulk::cli::{run, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "mailbulk=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output; logs go to stderr
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    if let Err(e) = run(cli).await {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}
