//! Error types for S3 object operations

use thiserror::Error;

pub type S3Result<T> = Result<T, S3Error>;

#[derive(Error, Debug)]
pub enum S3Error {
    /// The object (or its bucket) does not exist
    #[error("Object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// The request failed (network, auth, throttling, service error)
    #[error("S3 request failed for s3://{bucket}/{key}: {message}")]
    Request {
        bucket: String,
        key: String,
        message: String,
    },

    /// The response body could not be read to completion
    #[error("Failed to read body of s3://{bucket}/{key}: {message}")]
    Body {
        bucket: String,
        key: String,
        message: String,
    },
}

impl S3Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, S3Error::NotFound { .. })
    }
}
