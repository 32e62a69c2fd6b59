//! HTTP client for Elasticsearch-compatible clusters.
//!
//! Covers the handful of REST calls a bulk load needs: cluster health,
//! index existence/creation, settings updates, force merge and `_bulk`.
//! Static basic-auth credentials from configuration are passed through
//! unchanged.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use super::{BulkReport, BulkUploader, IndexAdmin, ItemResult, UploadError};
use crate::core::config::ConnectionConfig;
use crate::core::error::{MailbulkError, Result};

const ALREADY_EXISTS: &str = "resource_already_exists_exception";

/// Elasticsearch REST client
#[derive(Debug, Clone)]
pub struct ElasticsearchClient {
    http: Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

/// `_bulk` response body
#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<HashMap<String, BulkItem>>,
}

/// One entry of `items`, keyed by action name in the response
#[derive(Debug, Deserialize)]
struct BulkItem {
    status: u16,
    #[serde(default)]
    error: Option<Value>,
}

impl ElasticsearchClient {
    /// Create a client for the configured cluster
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_sec))
            .build()
            .map_err(|e| MailbulkError::Connection(format!("Failed to build HTTP client: {e}")))?;

        tracing::info!("Elasticsearch endpoint: {}", config.url);

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let builder = self.http.request(method, url);
        match &self.username {
            Some(user) => builder.basic_auth(user, self.password.as_ref()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response> {
        builder
            .send()
            .await
            .map_err(|e| MailbulkError::Connection(format!("{what}: {e}")))
    }

    /// Read a JSON body, treating an empty body as `null`
    async fn json_body(response: Response) -> Value {
        match response.bytes().await {
            Ok(bytes) if !bytes.is_empty() => {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            }
            _ => Value::Null,
        }
    }

    async fn expect_success(response: Response, what: &str) -> Result<Value> {
        let status = response.status();
        let body = Self::json_body(response).await;
        if status.is_success() {
            Ok(body)
        } else {
            Err(MailbulkError::IndexRequest(format!(
                "{what}: HTTP {status}: {}",
                error_reason(&body)
            )))
        }
    }
}

/// Human-readable reason from an Elasticsearch error body
fn error_reason(body: &Value) -> String {
    match &body["error"] {
        Value::Null => body.to_string(),
        error => describe_error(error),
    }
}

/// Format an `error` value, either `{type, reason}` or a plain string
fn describe_error(error: &Value) -> String {
    match error {
        Value::Object(fields) => {
            let kind = fields.get("type").and_then(Value::as_str).unwrap_or("error");
            match fields.get("reason").and_then(Value::as_str) {
                Some(reason) => format!("{kind}: {reason}"),
                None => kind.to_string(),
            }
        }
        Value::String(reason) => reason.clone(),
        other => other.to_string(),
    }
}

fn error_type(body: &Value) -> Option<&str> {
    body["error"]["type"].as_str()
}

/// Parse a `_bulk` response body into a report
pub(crate) fn parse_bulk_response(bytes: &[u8]) -> std::result::Result<BulkReport, UploadError> {
    let response: BulkResponse = serde_json::from_slice(bytes)
        .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

    let items = response
        .items
        .into_iter()
        .filter_map(|entry| entry.into_values().next())
        .map(|item| match item.error {
            Some(error) => ItemResult::failed(item.status, describe_error(&error)),
            None => ItemResult::ok(item.status),
        })
        .collect();

    Ok(BulkReport {
        errors: response.errors,
        items,
    })
}

fn classify_send_error(error: reqwest::Error, timeout: Duration) -> UploadError {
    if error.is_timeout() {
        UploadError::Timeout(timeout)
    } else {
        UploadError::Transport(error.to_string())
    }
}

#[async_trait]
impl BulkUploader for ElasticsearchClient {
    async fn upload(
        &self,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> std::result::Result<BulkReport, UploadError> {
        let response = self
            .request(Method::POST, "/_bulk")
            .header(CONTENT_TYPE, "application/x-ndjson")
            .timeout(timeout)
            .body(payload)
            .send()
            .await
            .map_err(|e| classify_send_error(e, timeout))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(UploadError::Unauthorized(format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_send_error(e, timeout))?;

        if !status.is_success() {
            let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            return Err(UploadError::Transport(format!(
                "HTTP {status}: {}",
                error_reason(&body)
            )));
        }

        parse_bulk_response(&bytes)
    }
}

#[async_trait]
impl IndexAdmin for ElasticsearchClient {
    async fn cluster_health(&self) -> Result<Value> {
        let response = self
            .send(self.request(Method::GET, "/_cluster/health"), "cluster health")
            .await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(MailbulkError::Connection(format!(
                "cluster rejected credentials (HTTP {status})"
            )));
        }
        Self::expect_success(response, "cluster health")
            .await
            .map_err(|e| MailbulkError::Connection(e.to_string()))
    }

    async fn index_exists(&self, index: &str) -> Result<bool> {
        let response = self
            .send(self.request(Method::HEAD, index), "index exists")
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(MailbulkError::IndexRequest(format!(
                "index exists: HTTP {status}"
            ))),
        }
    }

    async fn create_index(&self, index: &str, body: &Value) -> Result<()> {
        let response = self
            .send(self.request(Method::PUT, index).json(body), "create index")
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = Self::json_body(response).await;
        if error_type(&body) == Some(ALREADY_EXISTS) {
            return Err(MailbulkError::IndexAlreadyExists(index.to_string()));
        }

        Err(MailbulkError::IndexCreation {
            index: index.to_string(),
            message: format!("HTTP {status}: {}", error_reason(&body)),
        })
    }

    async fn put_settings(&self, index: &str, settings: &Value) -> Result<()> {
        let path = format!("{index}/_settings");
        let response = self
            .send(self.request(Method::PUT, &path).json(settings), "update settings")
            .await?;
        Self::expect_success(response, "update settings").await?;
        Ok(())
    }

    async fn force_merge(&self, index: &str, max_segments: u32) -> Result<()> {
        let path = format!("{index}/_forcemerge?max_num_segments={max_segments}");
        let response = self
            .send(self.request(Method::POST, &path), "force merge")
            .await?;
        Self::expect_success(response, "force merge").await?;
        Ok(())
    }
}
