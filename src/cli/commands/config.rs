//! Config command - show the effective configuration

use crate::cli::output::colors;
use crate::cli::OutputFormat;
use crate::core::config::Config;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the show-config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Config file (TOML)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    /// File the values were read from (`None` when only defaults apply)
    pub source: Option<String>,
    pub config: Config,
}

/// Build the response without printing it
pub fn describe(args: &ConfigArgs) -> crate::core::Result<ConfigResponse> {
    let source = Config::locate(args.config.as_deref())?;
    let config = Config::load(args.config.as_deref())?;

    Ok(ConfigResponse {
        source: source.map(|p| p.display().to_string()),
        config: config.redacted(),
    })
}

/// Execute the show-config command
pub fn execute(args: ConfigArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let response = describe(&args)?;
    let config = &response.config;

    match format {
        OutputFormat::Human => {
            println!("{}", colors::label("Configuration:"));
            println!(
                "  source: {}",
                response
                    .source
                    .as_deref()
                    .map(colors::file_path)
                    .unwrap_or_else(|| colors::dim("defaults"))
            );
            println!("  dataset:");
            println!("    encoding: {}", config.dataset.encoding);
            println!("    exclude_patterns: {:?}", config.dataset.exclude_patterns);
            println!("    skip_hidden: {}", config.dataset.skip_hidden);
            println!("  index:");
            println!("    name: {}", config.index.name);
            println!("    settings: {}", config.index.settings);
            match &config.index.routing {
                Some(routing) => println!("    routing: {routing}"),
                None => println!("    routing: {}", colors::dim("default")),
            }
            println!("    refresh_disabled: {}", config.index.refresh_disabled);
            println!("    refresh_steady: {}", config.index.refresh_steady);
            println!("    merge_segments: {}", config.index.merge_segments);
            println!("  bulk:");
            println!("    batch_size: {}", config.bulk.batch_size);
            println!("    timeout_sec: {}", config.bulk.timeout_sec);
            println!("  connection:");
            println!("    url: {}", config.connection.url);
            println!(
                "    username: {}",
                config.connection.username.as_deref().unwrap_or("-")
            );
            println!(
                "    password: {}",
                config.connection.password.as_deref().unwrap_or("-")
            );
            println!(
                "    connect_timeout_sec: {}",
                config.connection.connect_timeout_sec
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
