//! Configuration management for the mailbulk loader.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with defaults that match an Enron-style
//! maildir loaded into a local Elasticsearch node.

use crate::core::error::{MailbulkError, Result};
use crate::core::indexer::batch::RoutingDescriptor;
use crate::core::lifecycle::RefreshSettings;
use crate::core::xdg;
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Fallback config file in the working directory
const LOCAL_CONFIG: &str = "mailbulk.toml";

const REDACTED: &str = "********";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub bulk: BulkConfig,
    #[serde(default)]
    pub connection: ConnectionConfig,
}

/// How the corpus on disk is read
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DatasetConfig {
    /// WHATWG encoding label of the message files
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Files or directories to ignore (glob syntax)
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Ignore entries whose name starts with '.'
    #[serde(default = "default_skip_hidden")]
    pub skip_hidden: bool,
}

/// Target index and its ingest tuning
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IndexConfig {
    #[serde(default = "default_index_name")]
    pub name: String,

    /// Index creation body (settings/mappings), passed through as JSON
    #[serde(default = "default_index_settings")]
    pub settings: Value,

    /// Per-document action line; defaults to `{"index":{"_index":<name>}}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<Value>,

    /// refresh_interval while loading
    #[serde(default = "default_refresh_disabled")]
    pub refresh_disabled: String,

    /// refresh_interval after loading
    #[serde(default = "default_refresh_steady")]
    pub refresh_steady: String,

    /// Force merge target segment count
    #[serde(default = "default_merge_segments")]
    pub merge_segments: u32,
}

/// Bulk request sizing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BulkConfig {
    /// Documents per bulk request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_sec: u64,
}

/// Cluster endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_sec: u64,
}

// Default value functions
fn default_encoding() -> String {
    "windows-1252".to_string()
}

fn default_skip_hidden() -> bool {
    true
}

fn default_index_name() -> String {
    "emails".to_string()
}

fn default_index_settings() -> Value {
    json!({
        "mappings": {
            "properties": {
                "headers": {
                    "properties": {
                        "Date": {
                            "type": "date",
                            "format": "yyyy/MM/dd HH:mm:ss Z"
                        }
                    }
                }
            }
        }
    })
}

fn default_refresh_disabled() -> String {
    "-1".to_string()
}

fn default_refresh_steady() -> String {
    "1s".to_string()
}

fn default_merge_segments() -> u32 {
    5
}

fn default_batch_size() -> usize {
    1000
}

fn default_timeout() -> u64 {
    60
}

fn default_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            encoding: default_encoding(),
            exclude_patterns: Vec::new(),
            skip_hidden: default_skip_hidden(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: default_index_name(),
            settings: default_index_settings(),
            routing: None,
            refresh_disabled: default_refresh_disabled(),
            refresh_steady: default_refresh_steady(),
            merge_segments: default_merge_segments(),
        }
    }
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            timeout_sec: default_timeout(),
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: None,
            password: None,
            connect_timeout_sec: default_connect_timeout(),
        }
    }
}

impl IndexConfig {
    /// Action line written before every document
    pub fn routing_descriptor(&self) -> Result<RoutingDescriptor> {
        match &self.routing {
            Some(routing) => RoutingDescriptor::new(routing),
            None => Ok(RoutingDescriptor::for_index(&self.name)),
        }
    }

    pub fn refresh(&self) -> RefreshSettings {
        RefreshSettings {
            disabled: self.refresh_disabled.clone(),
            steady: self.refresh_steady.clone(),
        }
    }
}

impl BulkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_sec)
    }
}

/// Parse an environment variable, ignoring it (with a warning) if malformed
fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a valid value", name, raw);
            None
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            MailbulkError::ConfigError(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Find the config file to use, if any
    ///
    /// Priority order:
    /// 1. Explicit path (must exist)
    /// 2. MAILBULK_CONFIG env var (must exist)
    /// 3. XDG config file (~/.config/mailbulk/config.toml)
    /// 4. ./mailbulk.toml
    ///
    /// Returns `None` when no file applies and defaults should be used.
    pub fn locate(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        let required = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var("MAILBULK_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = required {
            if !path.is_file() {
                return Err(MailbulkError::ConfigError(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Some(path));
        }

        let xdg_config = xdg::config_file();
        if xdg_config.is_file() {
            return Ok(Some(xdg_config));
        }

        let local = PathBuf::from(LOCAL_CONFIG);
        if local.is_file() {
            return Ok(Some(local));
        }

        Ok(None)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match Self::locate(explicit)? {
            Some(path) => {
                tracing::debug!("Reading config from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };

        // Override with environment variables
        config.merge_env();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        // Connection configuration
        if let Ok(url) = env::var("MAILBULK_ES_URL") {
            self.connection.url = url;
        }
        if let Ok(username) = env::var("MAILBULK_ES_USERNAME") {
            self.connection.username = Some(username);
        }
        if let Ok(password) = env::var("MAILBULK_ES_PASSWORD") {
            self.connection.password = Some(password);
        }

        // Index configuration
        if let Ok(name) = env::var("MAILBULK_INDEX_NAME") {
            self.index.name = name;
        }
        if let Some(segments) = env_parse("MAILBULK_MERGE_SEGMENTS") {
            self.index.merge_segments = segments;
        }

        // Bulk configuration
        if let Some(size) = env_parse("MAILBULK_BATCH_SIZE") {
            self.bulk.batch_size = size;
        }
        if let Some(timeout) = env_parse("MAILBULK_TIMEOUT_SEC") {
            self.bulk.timeout_sec = timeout;
        }

        // Dataset configuration
        if let Ok(encoding) = env::var("MAILBULK_ENCODING") {
            self.dataset.encoding = encoding;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.index.name.trim().is_empty() {
            return Err(MailbulkError::ConfigError(
                "Index name must not be empty".to_string(),
            ));
        }

        if !self.index.settings.is_object() {
            return Err(MailbulkError::ConfigError(
                "Index settings must be a table".to_string(),
            ));
        }

        self.index.routing_descriptor()?;

        if self.index.merge_segments == 0 {
            return Err(MailbulkError::ConfigError(
                "Merge segments must be non-zero".to_string(),
            ));
        }

        if self.bulk.batch_size == 0 {
            return Err(MailbulkError::ConfigError(
                "Batch size must be non-zero".to_string(),
            ));
        }

        if self.bulk.timeout_sec == 0 {
            return Err(MailbulkError::ConfigError(
                "Bulk timeout must be non-zero".to_string(),
            ));
        }

        if Encoding::for_label(self.dataset.encoding.trim().as_bytes()).is_none() {
            return Err(MailbulkError::ConfigError(format!(
                "Unknown text encoding '{}'",
                self.dataset.encoding
            )));
        }

        for pattern in &self.dataset.exclude_patterns {
            glob::Pattern::new(pattern).map_err(|e| {
                MailbulkError::ConfigError(format!("Invalid exclude pattern '{pattern}': {e}"))
            })?;
        }

        let url = reqwest::Url::parse(&self.connection.url).map_err(|e| {
            MailbulkError::ConfigError(format!(
                "Invalid cluster URL '{}': {e}",
                self.connection.url
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(MailbulkError::ConfigError(format!(
                "Cluster URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        Ok(())
    }

    /// Copy of this config safe to print
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.connection.password.is_some() {
            config.connection.password = Some(REDACTED.to_string());
        }
        config
    }

    /// Log configuration (redacting sensitive values)
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Cluster URL: {}", self.connection.url);
        tracing::info!(
            "  Credentials: {}",
            match (&self.connection.username, &self.connection.password) {
                (Some(user), Some(_)) => format!("{user} / {REDACTED}"),
                (Some(user), None) => user.clone(),
                _ => "none".to_string(),
            }
        );
        tracing::info!("  Index: {}", self.index.name);
        tracing::info!(
            "  Refresh interval: {} while loading, {} after",
            self.index.refresh_disabled,
            self.index.refresh_steady
        );
        tracing::info!("  Merge segments: {}", self.index.merge_segments);
        tracing::info!("  Batch size: {} documents", self.bulk.batch_size);
        tracing::info!("  Bulk timeout: {}s", self.bulk.timeout_sec);
        tracing::info!("  Encoding: {}", self.dataset.encoding);
        tracing::info!(
            "  Exclude patterns: {} patterns",
            self.dataset.exclude_patterns.len()
        );
    }
}
