//! Tests for argument parsing, completions and output helpers

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use mailbulk::cli::commands::completions::write_completions;
use mailbulk::cli::output::{format_bytes, format_duration};
use mailbulk::cli::{Cli, Commands, OutputFormat};
use std::path::PathBuf;

// =============================================================================
// Argument parsing
// =============================================================================

#[test]
fn test_cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn test_load_defaults() {
    let cli = Cli::try_parse_from(["mailbulk", "load"]).unwrap();
    assert_eq!(cli.format, OutputFormat::Human);
    assert!(!cli.log_json);

    match cli.command {
        Commands::Load(args) => {
            assert_eq!(args.dataset, PathBuf::from("maildir"));
            assert!(args.config.is_none());
            assert!(!args.reuse_index);
            assert!(!args.dry_run);
            assert!(!args.quiet);
        }
        other => panic!("expected load, got {other:?}"),
    }
}

#[test]
fn test_load_flags() {
    let cli = Cli::try_parse_from([
        "mailbulk",
        "load",
        "-c",
        "es.toml",
        "-d",
        "/data/maildir",
        "--reuse-index",
        "--dry-run",
        "-q",
        "--format",
        "json",
        "--log-json",
    ])
    .unwrap();

    assert_eq!(cli.format, OutputFormat::Json);
    assert!(cli.log_json);
    match cli.command {
        Commands::Load(args) => {
            assert_eq!(args.config, Some(PathBuf::from("es.toml")));
            assert_eq!(args.dataset, PathBuf::from("/data/maildir"));
            assert!(args.reuse_index && args.dry_run && args.quiet);
        }
        other => panic!("expected load, got {other:?}"),
    }
}

#[test]
fn test_show_config_parses() {
    let cli = Cli::try_parse_from(["mailbulk", "show-config", "--config", "x.toml"]).unwrap();
    assert!(matches!(cli.command, Commands::ShowConfig(_)));
}

#[test]
fn test_unknown_command_rejected() {
    assert!(Cli::try_parse_from(["mailbulk", "search", "foo"]).is_err());
}

// =============================================================================
// Completions
// =============================================================================

#[test]
fn test_completions_mention_commands() {
    let mut out = Vec::new();
    write_completions(Shell::Bash, &mut out);
    let script = String::from_utf8(out).unwrap();

    assert!(script.contains("mailbulk"));
    assert!(script.contains("show-config"));
}

// =============================================================================
// Formatting helpers
// =============================================================================

#[test]
fn test_format_bytes_boundaries() {
    assert_eq!(format_bytes(0), "0 B");
    assert_eq!(format_bytes(1023), "1023 B");
    assert_eq!(format_bytes(1024), "1.0 KB");
    assert_eq!(format_bytes(1048576 - 1), "1024.0 KB");
    assert_eq!(format_bytes(1572864), "1.5 MB");
    assert_eq!(format_bytes(10737418240), "10.0 GB");
}

#[test]
fn test_format_duration_ranges() {
    assert_eq!(format_duration(0.0), "0ms");
    assert_eq!(format_duration(0.25), "250ms");
    assert_eq!(format_duration(59.0), "59.00s");
    assert_eq!(format_duration(125.0), "2m 5.0s");
    assert_eq!(format_duration(3600.0), "1h 0m");
}
