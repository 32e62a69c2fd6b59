//! Core loader logic (transport-agnostic)
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Documents, progress records and the load report
//! - **xdg**: XDG config directory handling
//! - **indexer**: Maildir walking, message parsing and batching pipeline
//! - **client**: Bulk upload and index admin backends
//! - **lifecycle**: Ordered index state machine around a load
//! - **loader**: One complete load, start to finish

pub mod client;
pub mod config;
pub mod error;
pub mod indexer;
pub mod lifecycle;
pub mod loader;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{MailbulkError, Result};
pub use loader::{run_load, LoadOptions};
