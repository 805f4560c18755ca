/// Data models for the image processor
///
/// Everything here lives for a single batch invocation.
use bytes::Bytes;
use event_schema::{S3EventRecord, SqsBatchResponse, SqsMessage};
use std::collections::{BTreeMap, BTreeSet};

/// One queue message: an opaque identifier and the raw body
#[derive(Debug, Clone)]
pub struct ChangeBatchMessage {
    pub message_id: String,
    pub body: Bytes,
}

impl ChangeBatchMessage {
    pub fn new(message_id: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            message_id: message_id.into(),
            body: body.into(),
        }
    }
}

impl From<SqsMessage> for ChangeBatchMessage {
    fn from(message: SqsMessage) -> Self {
        Self::new(message.message_id, message.body)
    }
}

/// One changed object parsed from a message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub bucket: String,
    pub key: String,
    pub size_bytes: i64,
    pub event_name: Option<String>,
}

impl From<S3EventRecord> for ChangeRecord {
    fn from(record: S3EventRecord) -> Self {
        Self {
            bucket: record.s3.bucket.name,
            key: record.s3.object.key,
            size_bytes: record.s3.object.size,
            event_name: record.event_name,
        }
    }
}

/// Keys written for one successfully processed source object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub original_key: String,
    /// variant name -> output key
    pub variant_keys: BTreeMap<String, String>,
}

/// Failed message identifiers accumulated over one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    failed_message_ids: BTreeSet<String>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_failed(&mut self, message_id: impl Into<String>) {
        self.failed_message_ids.insert(message_id.into());
    }

    pub fn failed_message_ids(&self) -> &BTreeSet<String> {
        &self.failed_message_ids
    }

    pub fn failed_count(&self) -> usize {
        self.failed_message_ids.len()
    }

    /// No message failed
    pub fn is_success(&self) -> bool {
        self.failed_message_ids.is_empty()
    }

    /// Partial batch response telling the queue which messages to redeliver
    pub fn to_response(&self) -> SqsBatchResponse {
        SqsBatchResponse::from_failed_ids(self.failed_message_ids.iter().cloned())
    }
}
