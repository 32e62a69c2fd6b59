//! Core data types for the mailbulk loader.
//!
//! Documents produced by the walker, per-batch progress records and
//! the final load report.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ordered header block of a message
///
/// Headers keep their order of first appearance. Inserting a name that
/// is already present replaces the value in place, so a repeated header
/// ends up at its first position with its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a header (exact name match)
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Look up a header by exact name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a header ignoring ASCII case
    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Replace the value of an existing header, matched ignoring case
    ///
    /// Returns false when no such header exists.
    pub fn replace_ignore_case(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(entry) => {
                entry.1 = value.into();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One normalized email, ready for the bulk endpoint
///
/// Fields are private: a document is never modified after the walker
/// builds it. Field order here is the JSON field order on the wire.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Document {
    /// Mailbox owner (first directory below the dataset root)
    #[serde(rename = "mailbox_owner")]
    owner: String,

    /// Folder path inside the mailbox
    #[serde(rename = "mail_folder")]
    folder: String,

    filename: String,

    /// Header block with `Date` in index format
    headers: Headers,

    /// Raw payload after the header block
    body: String,
}

impl Document {
    pub fn new(
        owner: impl Into<String>,
        folder: impl Into<String>,
        filename: impl Into<String>,
        headers: Headers,
        body: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            folder: folder.into(),
            filename: filename.into(),
            headers,
            body: body.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Progress record emitted after each uploaded batch
#[derive(Debug, Clone, serde::Serialize)]
pub struct BatchProgress {
    /// 1-based batch sequence number
    pub batch: usize,

    /// Documents in this batch
    pub size: usize,

    /// Items the endpoint rejected (all of them on transport failure)
    pub failed: usize,

    /// Whether this batch had any error
    pub errors: bool,

    /// Documents accepted so far, this batch included
    pub uploaded_total: usize,
}

/// Final statistics from a bulk load
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct LoadReport {
    pub index: String,

    /// Index was already present and reused
    pub index_reused: bool,

    /// Files encountered by the walker
    pub documents_discovered: usize,

    /// Files that did not produce a document
    pub documents_skipped: usize,

    /// Documents accepted by the bulk endpoint
    pub documents_uploaded: usize,

    /// Documents rejected or lost to failed batches
    pub items_failed: usize,

    pub batches: usize,
    pub batches_with_errors: usize,

    /// Payload bytes handed to the uploader
    pub bytes_sent: u64,

    pub refresh_disabled: bool,
    pub refresh_restored: bool,
    pub compacted: bool,

    /// Stopped early by an interrupt
    pub cancelled: bool,

    /// Load duration in milliseconds
    pub duration_ms: u64,
}

impl LoadReport {
    /// Every phase ran and every document made it in
    pub fn is_clean(&self) -> bool {
        !self.cancelled
            && self.refresh_restored
            && self.compacted
            && self.items_failed == 0
            && self.batches_with_errors == 0
    }
}
