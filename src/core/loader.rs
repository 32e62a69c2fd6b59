//! One complete bulk load
//!
//! Wires configuration, the document source, the load pipeline and the
//! index lifecycle together in their fixed order and turns the result
//! into a `LoadReport`.

use std::path::Path;

use crate::core::client::{BulkUploader, IndexAdmin};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::indexer::pipeline::{CancellationFlag, LoadPipeline};
use crate::core::indexer::walker::DocumentSource;
use crate::core::lifecycle::{IndexLifecycle, PrepareOutcome};
use crate::core::types::{BatchProgress, LoadReport};

/// Per-run switches that are not part of the config file
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Accept an index that already exists
    pub reuse_index: bool,
}

/// Load `dataset` into the configured index
///
/// Everything that can fail before the first document is checked first
/// (dataset root, encoding, routing descriptor), so such failures leave
/// the index untouched. Refresh is restored after per-batch errors and
/// after cancellation; a fatal load error skips it and leaves refresh
/// disabled. Compaction is skipped after cancellation and a compaction
/// failure is reported rather than returned.
pub async fn run_load<B, F>(
    backend: &B,
    config: &Config,
    dataset: &Path,
    options: LoadOptions,
    cancel: &CancellationFlag,
    on_batch: F,
) -> Result<LoadReport>
where
    B: IndexAdmin + BulkUploader + ?Sized,
    F: FnMut(&BatchProgress),
{
    let source = DocumentSource::from_config(dataset, &config.dataset)?;
    let pipeline = LoadPipeline::new(
        source,
        config.bulk.batch_size,
        config.index.routing_descriptor()?,
        config.bulk.timeout(),
    )?;

    let mut lifecycle = IndexLifecycle::new(backend, &config.index.name, config.index.refresh());

    let outcome = lifecycle
        .prepare(&config.index.settings, options.reuse_index)
        .await?;
    lifecycle.disable_refresh().await?;

    let summary = match lifecycle.load(pipeline, backend, cancel, on_batch).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(
                "Load into '{}' aborted: {}. Index left with refresh_interval={}",
                config.index.name,
                e,
                config.index.refresh_disabled
            );
            return Err(e);
        }
    };

    lifecycle.restore_refresh().await?;

    let compacted = if summary.cancelled {
        tracing::info!("Skipping forced merge of cancelled load");
        false
    } else {
        match lifecycle.compact(config.index.merge_segments).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Forced merge of '{}' failed: {}", config.index.name, e);
                false
            }
        }
    };

    Ok(LoadReport {
        index: config.index.name.clone(),
        index_reused: outcome == PrepareOutcome::Reused,
        documents_discovered: summary.walk.files_seen,
        documents_skipped: summary.walk.skipped,
        documents_uploaded: summary.documents_uploaded,
        items_failed: summary.items_failed,
        batches: summary.batches,
        batches_with_errors: summary.batches_with_errors,
        bytes_sent: summary.bytes_sent,
        refresh_disabled: true,
        refresh_restored: true,
        compacted,
        cancelled: summary.cancelled,
        duration_ms: summary.duration_ms,
    })
}
