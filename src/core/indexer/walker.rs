//! Maildir walker producing normalized documents.
//!
//! The dataset layout is `<root>/<owner>/<folder>[/<subfolder>...]/<file>`.
//! Traversal is lazy and follows walkdir order; no sorting is applied.
//! Files that cannot become a valid document are skipped and counted,
//! never fatal. Walk errors below the root (permission denied, etc.) are
//! logged and the walk continues; a root that cannot be read is fatal.

use encoding_rs::Encoding;
use glob::Pattern;
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::core::config::DatasetConfig;
use crate::core::error::{MailbulkError, Result};
use crate::core::indexer::date::normalize_date;
use crate::core::indexer::message::parse_message;
use crate::core::types::Document;

/// Why a file did not produce a document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("file is outside the owner/folder layout")]
    OutsideLayout,

    #[error("unreadable: {0}")]
    Unreadable(String),

    #[error("not valid {0} text")]
    Undecodable(&'static str),

    #[error("no Date header")]
    MissingDate,

    #[error("unparseable Date header: {0:?}")]
    InvalidDate(String),
}

/// Running counters for one walk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WalkStats {
    /// Regular files considered (documents + skipped)
    pub files_seen: usize,
    pub documents: usize,
    pub skipped: usize,
    pub outside_layout: usize,
    pub unreadable: usize,
    pub undecodable: usize,
    pub missing_date: usize,
    pub invalid_date: usize,
    /// Entries walkdir could not read (not counted as files)
    pub walk_errors: usize,
}

impl WalkStats {
    fn record_skip(&mut self, reason: &SkipReason) {
        self.skipped += 1;
        match reason {
            SkipReason::OutsideLayout => self.outside_layout += 1,
            SkipReason::Unreadable(_) => self.unreadable += 1,
            SkipReason::Undecodable(_) => self.undecodable += 1,
            SkipReason::MissingDate => self.missing_date += 1,
            SkipReason::InvalidDate(_) => self.invalid_date += 1,
        }
    }
}

/// Split a directory below `root` into (owner, folder)
///
/// Returns `None` for the root itself and for owner directories with
/// no folder below them.
pub fn classify(root: &Path, dir: &Path) -> Option<(String, String)> {
    let relative = dir.strip_prefix(root).ok()?;
    let mut segments = relative.components().filter_map(|c| match c {
        Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
        _ => None,
    });

    let owner = segments.next()?;
    let folder: PathBuf = segments.collect();
    if folder.as_os_str().is_empty() {
        return None;
    }

    Some((owner, folder.to_string_lossy().into_owned()))
}

/// Source of documents for one dataset root
#[derive(Debug, Clone)]
pub struct DocumentSource {
    root: PathBuf,
    encoding: &'static Encoding,
    exclude_patterns: Vec<Pattern>,
    skip_hidden: bool,
}

impl DocumentSource {
    /// Create a document source
    ///
    /// # Arguments
    ///
    /// * `root` - Dataset root directory (must exist)
    /// * `encoding_label` - WHATWG label of the corpus text encoding
    /// * `exclude_patterns` - Glob patterns for files/directories to ignore
    /// * `skip_hidden` - Ignore entries whose name starts with '.'
    pub fn new(
        root: impl AsRef<Path>,
        encoding_label: &str,
        exclude_patterns: Vec<String>,
        skip_hidden: bool,
    ) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(MailbulkError::InvalidPath(format!(
                "dataset root {} does not exist or is not a directory",
                root.display()
            )));
        }
        fs::read_dir(root).map_err(|e| {
            MailbulkError::InvalidPath(format!(
                "dataset root {} is not readable: {e}",
                root.display()
            ))
        })?;

        let encoding = Encoding::for_label(encoding_label.trim().as_bytes()).ok_or_else(|| {
            MailbulkError::ConfigError(format!("Unknown text encoding '{encoding_label}'"))
        })?;

        let exclude = exclude_patterns
            .into_iter()
            .map(|p| {
                Pattern::new(&p).map_err(|e| {
                    MailbulkError::ConfigError(format!("Invalid exclude pattern '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            root: root.to_path_buf(),
            encoding,
            exclude_patterns: exclude,
            skip_hidden,
        })
    }

    pub fn from_config(root: impl AsRef<Path>, config: &DatasetConfig) -> Result<Self> {
        Self::new(
            root,
            &config.encoding,
            config.exclude_patterns.clone(),
            config.skip_hidden,
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Start a fresh walk of the dataset
    ///
    /// Each call walks the filesystem from scratch.
    pub fn walk(&self) -> Documents {
        tracing::debug!("Walking {:?} ({})", self.root, self.encoding.name());
        Documents {
            entries: WalkDir::new(&self.root).follow_links(false).into_iter(),
            source: self.clone(),
            stats: WalkStats::default(),
            root_error: None,
        }
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        // Never filter the root directory
        if entry.depth() == 0 {
            return false;
        }

        if self.skip_hidden {
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with('.') {
                    return true;
                }
            }
        }

        let path = entry.path();
        self.exclude_patterns.iter().any(|p| {
            p.matches_path(path)
                || entry
                    .file_name()
                    .to_str()
                    .map(|name| p.matches(name))
                    .unwrap_or(false)
        })
    }

    /// Turn one file into a document
    fn load(&self, entry: &DirEntry) -> std::result::Result<Document, SkipReason> {
        let path = entry.path();
        let dir = path.parent().unwrap_or(&self.root);
        let (owner, folder) = classify(&self.root, dir).ok_or(SkipReason::OutsideLayout)?;

        let bytes = fs::read(path).map_err(|e| SkipReason::Unreadable(e.to_string()))?;
        let (text, had_errors) = self.encoding.decode_without_bom_handling(&bytes);
        if had_errors {
            return Err(SkipReason::Undecodable(self.encoding.name()));
        }

        let message = parse_message(&text);
        let mut headers = message.headers;

        let raw_date = headers
            .get_ignore_case("Date")
            .ok_or(SkipReason::MissingDate)?;
        let date =
            normalize_date(raw_date).ok_or_else(|| SkipReason::InvalidDate(raw_date.to_string()))?;
        headers.replace_ignore_case("Date", date);

        let filename = entry.file_name().to_string_lossy().into_owned();
        Ok(Document::new(owner, folder, filename, headers, message.body))
    }
}

/// Lazy iterator over the documents of one walk
///
/// Skips are counted in [`WalkStats`], available while iterating and
/// after exhaustion. An unreadable root ends the iteration; `finish`
/// reports it.
pub struct Documents {
    entries: walkdir::IntoIter,
    source: DocumentSource,
    stats: WalkStats,
    root_error: Option<String>,
}

impl Documents {
    pub fn stats(&self) -> &WalkStats {
        &self.stats
    }

    pub fn into_stats(self) -> WalkStats {
        self.stats
    }

    /// Final counters, or `InvalidPath` if the root itself could not be read
    pub fn finish(self) -> Result<WalkStats> {
        match self.root_error {
            Some(message) => Err(MailbulkError::InvalidPath(message)),
            None => Ok(self.stats),
        }
    }
}

impl Iterator for Documents {
    type Item = Document;

    fn next(&mut self) -> Option<Document> {
        loop {
            if self.root_error.is_some() {
                return None;
            }

            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    tracing::error!("Cannot read dataset root: {}", e);
                    self.root_error = Some(format!(
                        "dataset root {} is not readable: {e}",
                        self.source.root.display()
                    ));
                    return None;
                }
                Err(e) => {
                    tracing::warn!("Walk error: {}", e);
                    self.stats.walk_errors += 1;
                    // Continue walking despite errors
                    continue;
                }
            };

            if self.source.is_excluded(&entry) {
                if entry.file_type().is_dir() {
                    tracing::debug!("Skipping excluded directory: {:?}", entry.path());
                    self.entries.skip_current_dir();
                }
                continue;
            }

            if !entry.file_type().is_file() {
                continue;
            }

            self.stats.files_seen += 1;
            match self.source.load(&entry) {
                Ok(document) => {
                    self.stats.documents += 1;
                    return Some(document);
                }
                Err(reason) => {
                    tracing::debug!("Skipping {:?}: {}", entry.path(), reason);
                    self.stats.record_skip(&reason);
                }
            }
        }
    }
}
