//! Error types and error handling for the mailbulk loader.
//!
//! `MailbulkError` covers run-level failures: anything that stops a
//! load before it starts (bad dataset root, index conflicts, connection
//! problems) or aborts it midway. Per-document skips and per-batch
//! upload failures have their own types (`SkipReason`, `UploadError`)
//! because they never abort a run.

use thiserror::Error;

use crate::core::lifecycle::LifecycleState;

/// Result type alias for mailbulk operations
pub type Result<T> = std::result::Result<T, MailbulkError>;

/// Main error type for the mailbulk loader
#[derive(Error, Debug)]
pub enum MailbulkError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Index already exists: {0}")]
    IndexAlreadyExists(String),

    #[error("Failed to create index '{index}': {message}")]
    IndexCreation { index: String, message: String },

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Index request failed: {0}")]
    IndexRequest(String),

    #[error("Cannot {operation} while index is {state}")]
    LifecycleOrder {
        operation: &'static str,
        state: LifecycleState,
    },

    #[error("Load aborted: {0}")]
    LoadAborted(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl MailbulkError {
    /// Check if this is a conflict error (index already exists)
    pub fn is_conflict(&self) -> bool {
        matches!(self, MailbulkError::IndexAlreadyExists(_))
    }

    /// Lifecycle operations were called out of order
    pub fn is_lifecycle_violation(&self) -> bool {
        matches!(self, MailbulkError::LifecycleOrder { .. })
    }

    /// Errors raised before the index refresh setting was touched
    pub fn is_pre_load(&self) -> bool {
        matches!(
            self,
            MailbulkError::InvalidPath(_)
                | MailbulkError::ConfigError(_)
                | MailbulkError::IndexAlreadyExists(_)
                | MailbulkError::IndexCreation { .. }
                | MailbulkError::Connection(_)
        )
    }
}
