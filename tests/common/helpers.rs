// Test helper functions

use mailbulk::core::client::{ClusterEvent, InMemoryCluster};
use mailbulk::core::config::Config;
use mailbulk::core::error::Result;
use mailbulk::core::indexer::CancellationFlag;
use mailbulk::core::loader::{run_load, LoadOptions};
use mailbulk::core::types::LoadReport;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Default config with a custom batch size
#[allow(dead_code)] // Used in integration tests
pub fn test_config(batch_size: usize) -> Config {
    let mut config = Config::default();
    config.bulk.batch_size = batch_size;
    config
}

/// Run a full load against an in-memory cluster
#[allow(dead_code)] // Used in integration tests
pub async fn load_into(
    cluster: &InMemoryCluster,
    dataset: &Path,
    config: &Config,
) -> Result<LoadReport> {
    run_load(
        cluster,
        config,
        dataset,
        LoadOptions::default(),
        &CancellationFlag::new(),
        |_| {},
    )
    .await
}

/// Item counts of every bulk request, in order
#[allow(dead_code)] // Used in integration tests
pub fn bulk_sizes(events: &[ClusterEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|e| match e {
            ClusterEvent::Bulk { items, .. } => Some(*items),
            _ => None,
        })
        .collect()
}

/// Write a TOML config to a temp file
#[allow(dead_code)] // Used in integration tests
pub fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}
