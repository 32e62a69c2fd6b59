//! Size-bounded batching of documents into `_bulk` payloads.
//!
//! Each accepted document appends two NDJSON lines to the open batch:
//! the routing descriptor (serialized once) and the document itself.
//! A batch is sealed the moment it holds `capacity` documents; the
//! last batch may be smaller and an empty batch is never produced.

use serde_json::{json, Value};

use crate::core::error::{MailbulkError, Result};
use crate::core::types::Document;

/// Per-item action line shared by every document of a load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingDescriptor {
    line: Vec<u8>,
}

impl RoutingDescriptor {
    /// Serialize a descriptor such as `{"index":{"_index":"emails"}}`
    pub fn new(descriptor: &Value) -> Result<Self> {
        if !descriptor.is_object() {
            return Err(MailbulkError::ConfigError(format!(
                "Routing descriptor must be a JSON object, got {descriptor}"
            )));
        }
        Ok(Self {
            line: serde_json::to_vec(descriptor)?,
        })
    }

    /// Plain `index` action targeting `index`
    pub fn for_index(index: &str) -> Self {
        Self {
            line: json!({ "index": { "_index": index } }).to_string().into_bytes(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.line
    }
}

/// A sealed group of documents and their serialized payload
#[derive(Debug, Clone)]
pub struct Batch {
    number: usize,
    capacity: usize,
    documents: Vec<Document>,
    payload: Vec<u8>,
}

impl Batch {
    fn open(number: usize, capacity: usize) -> Self {
        Self {
            number,
            capacity,
            documents: Vec::with_capacity(capacity),
            payload: Vec::new(),
        }
    }

    fn push(&mut self, document: Document, descriptor: &RoutingDescriptor) -> Result<()> {
        let encoded = serde_json::to_vec(&document)?;
        self.payload.reserve(descriptor.as_bytes().len() + encoded.len() + 2);
        self.payload.extend_from_slice(descriptor.as_bytes());
        self.payload.push(b'\n');
        self.payload.extend_from_slice(&encoded);
        self.payload.push(b'\n');
        self.documents.push(document);
        Ok(())
    }

    /// 1-based position of this batch in the load
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.documents.len() >= self.capacity
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

/// Lazy adapter turning a document stream into batches
pub struct BatchAccumulator<I> {
    documents: I,
    capacity: usize,
    descriptor: RoutingDescriptor,
    produced: usize,
    unserializable: usize,
    exhausted: bool,
}

impl<I> BatchAccumulator<I>
where
    I: Iterator<Item = Document>,
{
    /// Create an accumulator
    ///
    /// # Arguments
    ///
    /// * `documents` - Document stream (consumed lazily)
    /// * `capacity` - Maximum documents per batch (must be non-zero)
    /// * `descriptor` - Routing descriptor written before every document
    pub fn new(documents: I, capacity: usize, descriptor: RoutingDescriptor) -> Result<Self> {
        if capacity == 0 {
            return Err(MailbulkError::ConfigError(
                "Batch size must be non-zero".to_string(),
            ));
        }

        Ok(Self {
            documents,
            capacity,
            descriptor,
            produced: 0,
            unserializable: 0,
            exhausted: false,
        })
    }

    /// Batches produced so far
    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Documents dropped because they could not be encoded as JSON
    ///
    /// They are in no batch, so callers count them as failed items.
    pub fn unserializable(&self) -> usize {
        self.unserializable
    }
}

impl<I> Iterator for BatchAccumulator<I>
where
    I: Iterator<Item = Document>,
{
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.exhausted {
            return None;
        }

        let mut batch = Batch::open(self.produced + 1, self.capacity);
        while !batch.is_full() {
            let Some(document) = self.documents.next() else {
                self.exhausted = true;
                break;
            };

            if let Err(e) = batch.push(document, &self.descriptor) {
                tracing::error!("Failed to serialize document: {}", e);
                self.unserializable += 1;
            }
        }

        if batch.is_empty() {
            return None;
        }

        self.produced += 1;
        Some(batch)
    }
}

/// Group `documents` into batches of at most `capacity`
pub fn accumulate<D>(
    documents: D,
    capacity: usize,
    descriptor: RoutingDescriptor,
) -> Result<BatchAccumulator<D::IntoIter>>
where
    D: IntoIterator<Item = Document>,
{
    BatchAccumulator::new(documents.into_iter(), capacity, descriptor)
}
