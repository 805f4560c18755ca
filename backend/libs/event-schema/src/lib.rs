/// Wire schemas consumed and produced by the image processing worker
///
/// Two documents travel through the queue:
/// - the S3 event notification, carried verbatim as the body of each queue message
/// - the SQS batch envelope handed to one invocation, and the partial batch
///   response returned from it
///
/// Unknown fields are ignored everywhere so newer producers stay compatible.
use serde::{Deserialize, Serialize};

pub mod sqs;

pub use sqs::{BatchItemFailure, SqsBatchEvent, SqsBatchResponse, SqsMessage};

// ============================================================================
// S3 EVENT NOTIFICATION
// ============================================================================

/// S3 event notification document (`{"Records": [...]}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3EventNotification {
    #[serde(rename = "Records")]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3EventRecord {
    /// e.g. "ObjectCreated:Put"
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub event_source: Option<String>,
    #[serde(default)]
    pub aws_region: Option<String>,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Object {
    pub key: String,
    /// Declared object size in bytes
    pub size: i64,
    #[serde(default)]
    pub e_tag: Option<String>,
}

impl S3EventNotification {
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }
}
