//! mailbulk - Streaming bulk loader for email corpora
//!
//! Walks an Enron-style maildir (`<root>/<owner>/<folder>/<file>`),
//! normalizes each message into a JSON document and ships the
//! documents in fixed-size `_bulk` requests to an Elasticsearch
//! compatible index, with refresh disabled while loading and a forced
//! merge at the end.
//!
//! # Architecture
//!
//! - **core**: Loader logic (transport-agnostic)
//!   - config, error, types, xdg
//!   - indexer (walk, parse, batch, pipeline)
//!   - client (Elasticsearch HTTP and in-memory backends)
//!   - lifecycle (index state machine)
//!   - loader (one complete run)
//!
//! - **cli**: Command-line adapter (depends on core)

// Core loader logic
pub mod core;

// Command-line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use core::client::{Backend, BulkUploader, IndexAdmin};
pub use core::config::Config;
pub use core::error::{MailbulkError, Result};
pub use core::lifecycle::{IndexLifecycle, LifecycleState};
pub use core::loader::{run_load, LoadOptions};
pub use core::types::*;
