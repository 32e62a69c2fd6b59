//! In-memory cluster backend.
//!
//! Accepts the same calls as a real cluster and records them in order,
//! so a load can be dry-run without a network and the lifecycle can be
//! checked call by call. Failure injection hooks let callers simulate
//! item rejections, transport failures and revoked credentials.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::{BulkReport, BulkUploader, IndexAdmin, ItemResult, UploadError};
use crate::core::error::{MailbulkError, Result};

/// One call received by the cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterEvent {
    CreateIndex {
        index: String,
    },
    PutSettings {
        index: String,
        refresh_interval: Option<String>,
    },
    Bulk {
        items: usize,
        failed: usize,
    },
    ForceMerge {
        index: String,
        max_segments: u32,
    },
}

#[derive(Debug, Default)]
struct ClusterState {
    /// Index name -> stored documents
    indices: BTreeMap<String, Vec<Value>>,
    refresh_intervals: BTreeMap<String, String>,
    events: Vec<ClusterEvent>,
    bulk_calls: usize,
    reject_containing: Option<String>,
    fail_bulk_calls: HashSet<usize>,
    unauthorized_from: Option<usize>,
}

/// Cluster that lives entirely in process memory
#[derive(Debug, Default)]
pub struct InMemoryCluster {
    state: Mutex<ClusterState>,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `index` already present
    pub fn with_index(self, index: &str) -> Self {
        self.state().indices.insert(index.to_string(), Vec::new());
        self
    }

    /// Reject (HTTP 400) any document whose JSON contains `needle`
    pub fn reject_documents_containing(self, needle: &str) -> Self {
        self.state().reject_containing = Some(needle.to_string());
        self
    }

    /// Fail the `call`-th bulk request (1-based) with a transport error
    pub fn fail_bulk_call(self, call: usize) -> Self {
        self.state().fail_bulk_calls.insert(call);
        self
    }

    /// Answer 401 from the `call`-th bulk request (1-based) onwards
    pub fn unauthorized_from_bulk_call(self, call: usize) -> Self {
        self.state().unauthorized_from = Some(call);
        self
    }

    fn state(&self) -> MutexGuard<'_, ClusterState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Calls received so far, in order
    pub fn events(&self) -> Vec<ClusterEvent> {
        self.state().events.clone()
    }

    /// Stored documents in `index`
    pub fn document_count(&self, index: &str) -> usize {
        self.state().indices.get(index).map_or(0, Vec::len)
    }

    /// Stored documents in `index`, in arrival order
    pub fn documents(&self, index: &str) -> Vec<Value> {
        self.state().indices.get(index).cloned().unwrap_or_default()
    }

    pub fn refresh_interval(&self, index: &str) -> Option<String> {
        self.state().refresh_intervals.get(index).cloned()
    }

    pub fn bulk_calls(&self) -> usize {
        self.state().bulk_calls
    }
}

/// Target index named by a bulk action line
fn action_index(action: &Value) -> Option<&str> {
    action
        .as_object()?
        .values()
        .next()?
        .get("_index")?
        .as_str()
}

#[async_trait]
impl BulkUploader for InMemoryCluster {
    async fn upload(
        &self,
        payload: Vec<u8>,
        _timeout: Duration,
    ) -> std::result::Result<BulkReport, UploadError> {
        let mut state = self.state();
        state.bulk_calls += 1;
        let call = state.bulk_calls;

        if state.unauthorized_from.is_some_and(|from| call >= from) {
            return Err(UploadError::Unauthorized("HTTP 401 Unauthorized".to_string()));
        }
        if state.fail_bulk_calls.contains(&call) {
            return Err(UploadError::Transport("connection reset by peer".to_string()));
        }

        let text = String::from_utf8(payload)
            .map_err(|e| UploadError::Transport(format!("payload is not UTF-8: {e}")))?;
        let lines: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();
        if lines.len() % 2 != 0 {
            return Err(UploadError::Transport(
                "bulk body must be action/source line pairs".to_string(),
            ));
        }

        let mut items = Vec::with_capacity(lines.len() / 2);
        for pair in lines.chunks(2) {
            let action: Value = match serde_json::from_str(pair[0]) {
                Ok(action) => action,
                Err(e) => {
                    items.push(ItemResult::failed(400, format!("parse_exception: {e}")));
                    continue;
                }
            };
            let Some(index) = action_index(&action).map(str::to_string) else {
                items.push(ItemResult::failed(
                    400,
                    "action_request_validation_exception: index is missing",
                ));
                continue;
            };

            let rejected = state
                .reject_containing
                .as_deref()
                .is_some_and(|needle| pair[1].contains(needle));
            if rejected {
                items.push(ItemResult::failed(
                    400,
                    "mapper_parsing_exception: document rejected",
                ));
                continue;
            }

            match serde_json::from_str::<Value>(pair[1]) {
                Ok(document) => {
                    state.indices.entry(index).or_default().push(document);
                    items.push(ItemResult::ok(201));
                }
                Err(e) => items.push(ItemResult::failed(
                    400,
                    format!("mapper_parsing_exception: {e}"),
                )),
            }
        }

        let report = BulkReport {
            errors: items.iter().any(|i| !i.is_success()),
            items,
        };
        state.events.push(ClusterEvent::Bulk {
            items: report.items.len(),
            failed: report.failed(),
        });
        Ok(report)
    }
}

#[async_trait]
impl IndexAdmin for InMemoryCluster {
    async fn cluster_health(&self) -> Result<Value> {
        let state = self.state();
        Ok(json!({
            "cluster_name": "in-memory",
            "status": "green",
            "number_of_nodes": 1,
            "indices": state.indices.len(),
        }))
    }

    async fn index_exists(&self, index: &str) -> Result<bool> {
        Ok(self.state().indices.contains_key(index))
    }

    async fn create_index(&self, index: &str, body: &Value) -> Result<()> {
        let mut state = self.state();
        if state.indices.contains_key(index) {
            return Err(MailbulkError::IndexAlreadyExists(index.to_string()));
        }
        if !body.is_object() {
            return Err(MailbulkError::IndexCreation {
                index: index.to_string(),
                message: "request body must be a JSON object".to_string(),
            });
        }

        state.indices.insert(index.to_string(), Vec::new());
        if let Some(interval) = body["settings"]["index"]["refresh_interval"].as_str() {
            state
                .refresh_intervals
                .insert(index.to_string(), interval.to_string());
        }
        state.events.push(ClusterEvent::CreateIndex {
            index: index.to_string(),
        });
        Ok(())
    }

    async fn put_settings(&self, index: &str, settings: &Value) -> Result<()> {
        let mut state = self.state();
        if !state.indices.contains_key(index) {
            return Err(MailbulkError::IndexRequest(format!(
                "update settings: no such index [{index}]"
            )));
        }

        let refresh_interval = settings["index"]["refresh_interval"]
            .as_str()
            .map(str::to_string);
        if let Some(interval) = &refresh_interval {
            state
                .refresh_intervals
                .insert(index.to_string(), interval.clone());
        }
        state.events.push(ClusterEvent::PutSettings {
            index: index.to_string(),
            refresh_interval,
        });
        Ok(())
    }

    async fn force_merge(&self, index: &str, max_segments: u32) -> Result<()> {
        let mut state = self.state();
        if !state.indices.contains_key(index) {
            return Err(MailbulkError::IndexRequest(format!(
                "force merge: no such index [{index}]"
            )));
        }
        state.events.push(ClusterEvent::ForceMerge {
            index: index.to_string(),
            max_segments,
        });
        Ok(())
    }
}
