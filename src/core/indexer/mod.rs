//! Document production and batching.
//!
//! Turns a maildir tree into `_bulk` payloads. Key pieces:
//!
//! - Lazy directory walk with owner/folder classification
//! - Permissive header/body split of raw RFC 822 text
//! - `Date` header normalization to the index format
//! - Size-bounded NDJSON batching
//! - Producer/uploader pipeline with a bounded hand-off
//!
//! Nothing here ever collects the whole corpus in memory.

pub mod batch;
pub mod date;
pub mod message;
pub mod pipeline;
pub mod walker;

pub use batch::{accumulate, Batch, BatchAccumulator, RoutingDescriptor};
pub use date::normalize_date;
pub use message::{parse_message, RawMessage};
pub use pipeline::{CancellationFlag, LoadPipeline, LoadSummary};
pub use walker::{DocumentSource, Documents, SkipReason, WalkStats};
