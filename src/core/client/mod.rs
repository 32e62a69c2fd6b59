//! Search index clients.
//!
//! The load pipeline talks to the index through two traits:
//!
//! - **BulkUploader**: ships one serialized `_bulk` payload and reports
//!   per-item results
//! - **IndexAdmin**: the management calls the index lifecycle needs
//!
//! Two backends implement both: `ElasticsearchClient` (HTTP) and
//! `InMemoryCluster` (dry runs and tests). `Backend` picks one at
//! runtime.

pub mod elasticsearch;
pub mod memory;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::core::config::Config;
use crate::core::error::{MailbulkError, Result};

pub use elasticsearch::ElasticsearchClient;
pub use memory::{ClusterEvent, InMemoryCluster};

/// Outcome of one bulk item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResult {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemResult {
    pub fn ok(status: u16) -> Self {
        Self {
            status,
            error: None,
        }
    }

    pub fn failed(status: u16, error: impl Into<String>) -> Self {
        Self {
            status,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status)
    }
}

/// Response to one bulk request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    /// The endpoint flagged at least one item as failed
    pub errors: bool,
    pub items: Vec<ItemResult>,
}

impl BulkReport {
    pub fn failed(&self) -> usize {
        self.items.iter().filter(|i| !i.is_success()).count()
    }

    pub fn succeeded(&self) -> usize {
        self.items.len() - self.failed()
    }

    /// First item error, for log lines
    pub fn first_error(&self) -> Option<&str> {
        self.items.iter().find_map(|i| i.error.as_deref())
    }
}

/// Failure of a whole bulk request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("bulk request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("bulk endpoint rejected credentials: {0}")]
    Unauthorized(String),

    #[error("invalid bulk response: {0}")]
    InvalidResponse(String),
}

impl UploadError {
    /// Retrying the next batch cannot succeed either
    pub fn is_fatal(&self) -> bool {
        matches!(self, UploadError::Unauthorized(_))
    }
}

/// Ships pre-serialized `_bulk` payloads
#[async_trait]
pub trait BulkUploader: Send + Sync {
    async fn upload(
        &self,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> std::result::Result<BulkReport, UploadError>;
}

/// Index management calls used around a load
#[async_trait]
pub trait IndexAdmin: Send + Sync {
    /// Cluster health document (`GET /_cluster/health`)
    async fn cluster_health(&self) -> Result<Value>;

    async fn index_exists(&self, index: &str) -> Result<bool>;

    /// Create `index` with a settings/mappings body
    ///
    /// Fails with `IndexAlreadyExists` when the index is present.
    async fn create_index(&self, index: &str, body: &Value) -> Result<()>;

    /// Update dynamic index settings
    async fn put_settings(&self, index: &str, settings: &Value) -> Result<()>;

    /// Merge segments down to at most `max_segments`
    async fn force_merge(&self, index: &str, max_segments: u32) -> Result<()>;
}

/// Runtime-selected index backend
#[derive(Debug)]
pub enum Backend {
    Elasticsearch(ElasticsearchClient),
    InMemory(InMemoryCluster),
}

impl Backend {
    /// Build the backend for a run and verify it answers
    ///
    /// `dry_run` swaps the HTTP client for an in-memory cluster so the
    /// whole pipeline can run without a network.
    pub async fn connect(config: &Config, dry_run: bool) -> Result<Self> {
        let backend = if dry_run {
            tracing::info!("Dry run: using in-memory cluster");
            Backend::InMemory(InMemoryCluster::new())
        } else {
            Backend::Elasticsearch(ElasticsearchClient::new(&config.connection)?)
        };

        let health = backend.cluster_health().await.map_err(|e| match e {
            MailbulkError::Connection(_) => e,
            other => MailbulkError::Connection(other.to_string()),
        })?;
        tracing::info!(
            "Cluster '{}' status: {}",
            health["cluster_name"].as_str().unwrap_or("unknown"),
            health["status"].as_str().unwrap_or("unknown")
        );

        Ok(backend)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Elasticsearch(_) => "elasticsearch",
            Backend::InMemory(_) => "in-memory",
        }
    }
}

#[async_trait]
impl BulkUploader for Backend {
    async fn upload(
        &self,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> std::result::Result<BulkReport, UploadError> {
        match self {
            Backend::Elasticsearch(client) => client.upload(payload, timeout).await,
            Backend::InMemory(cluster) => cluster.upload(payload, timeout).await,
        }
    }
}

#[async_trait]
impl IndexAdmin for Backend {
    async fn cluster_health(&self) -> Result<Value> {
        match self {
            Backend::Elasticsearch(client) => client.cluster_health().await,
            Backend::InMemory(cluster) => cluster.cluster_health().await,
        }
    }

    async fn index_exists(&self, index: &str) -> Result<bool> {
        match self {
            Backend::Elasticsearch(client) => client.index_exists(index).await,
            Backend::InMemory(cluster) => cluster.index_exists(index).await,
        }
    }

    async fn create_index(&self, index: &str, body: &Value) -> Result<()> {
        match self {
            Backend::Elasticsearch(client) => client.create_index(index, body).await,
            Backend::InMemory(cluster) => cluster.create_index(index, body).await,
        }
    }

    async fn put_settings(&self, index: &str, settings: &Value) -> Result<()> {
        match self {
            Backend::Elasticsearch(client) => client.put_settings(index, settings).await,
            Backend::InMemory(cluster) => cluster.put_settings(index, settings).await,
        }
    }

    async fn force_merge(&self, index: &str, max_segments: u32) -> Result<()> {
        match self {
            Backend::Elasticsearch(client) => client.force_merge(index, max_segments).await,
            Backend::InMemory(cluster) => cluster.force_merge(index, max_segments).await,
        }
    }
}
