//! Streaming load pipeline.
//!
//! Coordinates the end-to-end load:
//! 1. Walk the dataset and parse messages (blocking task)
//! 2. Group documents into sealed batches
//! 3. Hand each batch over a depth-1 channel to the upload loop
//! 4. Upload, count, report progress
//!
//! At most one sealed batch waits in the channel while another is being
//! uploaded, so memory stays bounded by two batches regardless of corpus
//! size.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::mpsc;

use crate::core::client::{BulkUploader, UploadError};
use crate::core::error::{MailbulkError, Result};
use crate::core::indexer::batch::{accumulate, Batch, RoutingDescriptor};
use crate::core::indexer::walker::{DocumentSource, WalkStats};
use crate::core::types::BatchProgress;

/// Shared stop request, checked between batches
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Counters from one pipeline run
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadSummary {
    pub walk: WalkStats,
    pub batches: usize,
    pub batches_with_errors: usize,
    pub documents_uploaded: usize,
    pub items_failed: usize,
    pub bytes_sent: u64,
    pub cancelled: bool,
    pub duration_ms: u64,
}

/// Walk, batch and upload one dataset
pub struct LoadPipeline {
    source: DocumentSource,
    batch_size: usize,
    descriptor: RoutingDescriptor,
    timeout: Duration,
}

impl LoadPipeline {
    /// Create a new load pipeline
    ///
    /// # Arguments
    ///
    /// * `source` - Dataset to walk
    /// * `batch_size` - Documents per bulk request (must be non-zero)
    /// * `descriptor` - Action line written before every document
    /// * `timeout` - Limit for each bulk request
    pub fn new(
        source: DocumentSource,
        batch_size: usize,
        descriptor: RoutingDescriptor,
        timeout: Duration,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(MailbulkError::ConfigError(
                "Batch size must be non-zero".to_string(),
            ));
        }

        Ok(Self {
            source,
            batch_size,
            descriptor,
            timeout,
        })
    }

    /// Run the pipeline to completion, cancellation or a fatal error
    ///
    /// Per-batch failures are counted and the run continues. A rejected
    /// credential aborts with `LoadAborted`. `on_batch` is called after
    /// every attempted batch.
    pub async fn run<U, F>(
        self,
        uploader: &U,
        cancel: &CancellationFlag,
        mut on_batch: F,
    ) -> Result<LoadSummary>
    where
        U: BulkUploader + ?Sized,
        F: FnMut(&BatchProgress),
    {
        let start = Instant::now();
        let timeout = self.timeout;
        let (tx, mut rx) = mpsc::channel::<Batch>(1);

        let LoadPipeline {
            source,
            batch_size,
            descriptor,
            ..
        } = self;
        let producer = tokio::task::spawn_blocking(move || -> Result<(WalkStats, usize)> {
            let mut documents = source.walk();
            let mut batches = accumulate(documents.by_ref(), batch_size, descriptor)?;
            for batch in batches.by_ref() {
                if tx.blocking_send(batch).is_err() {
                    // Receiver gone: cancelled or aborted
                    break;
                }
            }
            let unserializable = batches.unserializable();
            drop(batches);
            Ok((documents.finish()?, unserializable))
        });

        let mut summary = LoadSummary::default();
        let mut fatal = None;

        loop {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let Some(batch) = rx.recv().await else {
                break;
            };

            // A batch is either uploaded in full or never attempted
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let number = batch.number();
            let size = batch.len();
            let payload = batch.into_payload();
            summary.bytes_sent += payload.len() as u64;
            summary.batches += 1;

            let outcome =
                match tokio::time::timeout(timeout, uploader.upload(payload, timeout)).await {
                    Ok(result) => result,
                    Err(_) => Err(UploadError::Timeout(timeout)),
                };

            let (uploaded, failed, flagged) = match outcome {
                Ok(report) => {
                    let failed = report.failed();
                    let flagged = report.errors || failed > 0;
                    if flagged {
                        tracing::warn!(
                            "Batch {}: {} of {} items failed (first error: {})",
                            number,
                            failed,
                            size,
                            report.first_error().unwrap_or("unknown")
                        );
                    }
                    (report.succeeded(), failed, flagged)
                }
                Err(e) if e.is_fatal() => {
                    tracing::error!("Batch {}: {}", number, e);
                    summary.items_failed += size;
                    summary.batches_with_errors += 1;
                    fatal = Some(e);
                    break;
                }
                Err(e) => {
                    tracing::warn!("Batch {} failed: {}", number, e);
                    (0, size, true)
                }
            };

            summary.documents_uploaded += uploaded;
            summary.items_failed += failed;
            if flagged {
                summary.batches_with_errors += 1;
            }

            let progress = BatchProgress {
                batch: number,
                size,
                failed,
                errors: flagged,
                uploaded_total: summary.documents_uploaded,
            };
            tracing::info!(
                "{} emails uploaded. Errors: {}",
                progress.size,
                progress.errors
            );
            on_batch(&progress);
        }

        // Closing the channel stops the producer at its next batch
        drop(rx);
        let (walk, unserializable) = producer
            .await
            .map_err(|e| MailbulkError::LoadAborted(format!("document walker failed: {e}")))??;

        if let Some(e) = fatal {
            return Err(MailbulkError::LoadAborted(e.to_string()));
        }

        if unserializable > 0 {
            tracing::warn!("{} documents could not be serialized", unserializable);
            summary.items_failed += unserializable;
        }
        summary.walk = walk;
        summary.duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "Finished uploading: {} documents in {} batches, {} skipped, {} failed items in {}ms",
            summary.documents_uploaded,
            summary.batches,
            summary.walk.skipped,
            summary.items_failed,
            summary.duration_ms
        );
        if summary.cancelled {
            tracing::warn!("Load cancelled after {} batches", summary.batches);
        }

        Ok(summary)
    }
}
