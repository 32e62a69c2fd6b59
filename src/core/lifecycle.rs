//! Index lifecycle around a bulk load.
//!
//! A load moves the target index through a fixed sequence of states:
//!
//! ```text
//! Created -> RefreshDisabled -> Loading -> RefreshRestored -> Compacted
//! ```
//!
//! `prepare` (create the index) runs in `Created` before the first
//! transition. Each operation checks the current state first and fails
//! with `LifecycleOrder` without touching the index when called out of
//! order. States never go backwards and none can be skipped.

use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

use crate::core::client::{BulkUploader, IndexAdmin};
use crate::core::error::{MailbulkError, Result};
use crate::core::indexer::pipeline::{CancellationFlag, LoadPipeline, LoadSummary};
use crate::core::types::BatchProgress;

/// Where an index is in its load lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Created,
    RefreshDisabled,
    Loading,
    RefreshRestored,
    Compacted,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Created => "created",
            LifecycleState::RefreshDisabled => "refresh-disabled",
            LifecycleState::Loading => "loading",
            LifecycleState::RefreshRestored => "refresh-restored",
            LifecycleState::Compacted => "compacted",
        };
        f.write_str(name)
    }
}

/// How `prepare` obtained the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepareOutcome {
    Created,
    Reused,
}

/// refresh_interval values used around a load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSettings {
    /// While loading (`-1` disables refresh)
    pub disabled: String,
    /// After loading
    pub steady: String,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            disabled: "-1".to_string(),
            steady: "1s".to_string(),
        }
    }
}

fn refresh_body(interval: &str) -> Value {
    json!({ "index": { "refresh_interval": interval } })
}

/// State machine driving one index through a load
pub struct IndexLifecycle<'a, A: IndexAdmin + ?Sized> {
    admin: &'a A,
    index: String,
    refresh: RefreshSettings,
    state: LifecycleState,
    prepared: bool,
}

impl<'a, A: IndexAdmin + ?Sized> IndexLifecycle<'a, A> {
    pub fn new(admin: &'a A, index: impl Into<String>, refresh: RefreshSettings) -> Self {
        Self {
            admin,
            index: index.into(),
            refresh,
            state: LifecycleState::Created,
            prepared: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    fn require(&self, operation: &'static str, expected: LifecycleState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(MailbulkError::LifecycleOrder {
                operation,
                state: self.state,
            })
        }
    }

    /// Create the index with `body`
    ///
    /// With `reuse`, an index that already exists is accepted as is.
    /// Without it, an existing index fails with `IndexAlreadyExists`.
    pub async fn prepare(&mut self, body: &Value, reuse: bool) -> Result<PrepareOutcome> {
        self.require("prepare", LifecycleState::Created)?;
        if self.prepared {
            return Err(MailbulkError::LifecycleOrder {
                operation: "prepare",
                state: self.state,
            });
        }

        let outcome = self.create(body, reuse).await?;
        self.prepared = true;
        Ok(outcome)
    }

    async fn create(&self, body: &Value, reuse: bool) -> Result<PrepareOutcome> {
        if reuse && self.admin.index_exists(&self.index).await? {
            tracing::info!("Reusing existing index '{}'", self.index);
            return Ok(PrepareOutcome::Reused);
        }

        match self.admin.create_index(&self.index, body).await {
            Ok(()) => {
                tracing::info!("Index '{}' created", self.index);
                Ok(PrepareOutcome::Created)
            }
            Err(MailbulkError::IndexAlreadyExists(_)) if reuse => {
                tracing::info!("Reusing existing index '{}'", self.index);
                Ok(PrepareOutcome::Reused)
            }
            Err(e @ (MailbulkError::IndexAlreadyExists(_) | MailbulkError::IndexCreation { .. })) => {
                Err(e)
            }
            Err(e) => Err(MailbulkError::IndexCreation {
                index: self.index.clone(),
                message: e.to_string(),
            }),
        }
    }

    /// Turn refresh off for the duration of the load
    ///
    /// Requires a successful `prepare`.
    pub async fn disable_refresh(&mut self) -> Result<()> {
        self.require("disable refresh", LifecycleState::Created)?;
        if !self.prepared {
            return Err(MailbulkError::LifecycleOrder {
                operation: "disable refresh",
                state: self.state,
            });
        }

        self.admin
            .put_settings(&self.index, &refresh_body(&self.refresh.disabled))
            .await?;
        self.state = LifecycleState::RefreshDisabled;

        tracing::info!(
            "Refresh interval of '{}' set to {}",
            self.index,
            self.refresh.disabled
        );
        Ok(())
    }

    /// Run the load pipeline against the index
    ///
    /// The state stays `Loading` afterwards whether the pipeline
    /// completes or fails.
    pub async fn load<U, F>(
        &mut self,
        pipeline: LoadPipeline,
        uploader: &U,
        cancel: &CancellationFlag,
        on_batch: F,
    ) -> Result<LoadSummary>
    where
        U: BulkUploader + ?Sized,
        F: FnMut(&BatchProgress),
    {
        self.require("load", LifecycleState::RefreshDisabled)?;
        self.state = LifecycleState::Loading;

        tracing::info!("Started uploading into '{}'", self.index);
        pipeline.run(uploader, cancel, on_batch).await
    }

    /// Put refresh back to its steady value
    pub async fn restore_refresh(&mut self) -> Result<()> {
        self.require("restore refresh", LifecycleState::Loading)?;

        self.admin
            .put_settings(&self.index, &refresh_body(&self.refresh.steady))
            .await?;
        self.state = LifecycleState::RefreshRestored;

        tracing::info!(
            "Refresh interval of '{}' set back to {}",
            self.index,
            self.refresh.steady
        );
        Ok(())
    }

    /// Force merge the index down to `segments` segments
    pub async fn compact(&mut self, segments: u32) -> Result<()> {
        self.require("compact", LifecycleState::RefreshRestored)?;

        tracing::info!("Forced merge of '{}' started", self.index);
        self.admin.force_merge(&self.index, segments).await?;
        self.state = LifecycleState::Compacted;
        tracing::info!("Forced merge of '{}' finished", self.index);
        Ok(())
    }
}
