//! Tests for the show-config command

use crate::common::write_config;
use mailbulk::cli::commands::config::{describe, execute, ConfigArgs};
use mailbulk::cli::OutputFormat;
use serial_test::serial;
use std::path::PathBuf;

#[test]
#[serial]
fn test_describe_reads_explicit_file() {
    let file = write_config(
        "[index]\nname = \"enron\"\n\n[connection]\nusername = \"loader\"\npassword = \"s3cret\"\n",
    );

    let response = describe(&ConfigArgs {
        config: Some(file.path().to_path_buf()),
    })
    .unwrap();

    assert_eq!(
        response.source.as_deref(),
        Some(file.path().display().to_string().as_str())
    );
    assert_eq!(response.config.index.name, "enron");
    assert_eq!(response.config.connection.username.as_deref(), Some("loader"));
    assert_ne!(response.config.connection.password.as_deref(), Some("s3cret"));
}

#[test]
#[serial]
fn test_json_output_never_contains_password() {
    let file = write_config("[connection]\npassword = \"s3cret\"\n");
    let response = describe(&ConfigArgs {
        config: Some(file.path().to_path_buf()),
    })
    .unwrap();

    let json = serde_json::to_string(&response).unwrap();
    assert!(!json.contains("s3cret"));
    assert!(json.contains("\"batch_size\":1000"));
}

#[test]
#[serial]
fn test_execute_both_formats() {
    let file = write_config("[bulk]\nbatch_size = 250\n");

    for format in [OutputFormat::Human, OutputFormat::Json] {
        let args = ConfigArgs {
            config: Some(file.path().to_path_buf()),
        };
        assert!(execute(args, format).is_ok());
    }
}

#[test]
#[serial]
fn test_missing_file_is_error() {
    let result = describe(&ConfigArgs {
        config: Some(PathBuf::from("/nonexistent/mailbulk.toml")),
    });
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_malformed_toml_is_error() {
    let file = write_config("[bulk\nbatch_size = ");
    let result = describe(&ConfigArgs {
        config: Some(file.path().to_path_buf()),
    });
    assert!(result.is_err());
}
