/// Error types for the image processor
///
/// Failures are grouped by the layer that raises them. Only the batch layer
/// decides what a failure means for the queue: every `BatchError` marks the
/// enclosing message as failed and nothing more.
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, ProcessError>;

/// Configuration could not be loaded or is out of range
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Storage collaborator failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("{0}")]
    Backend(String),
}

/// Image pipeline failure, one variant per stage
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to fetch {bucket}/{key}: {source}")]
    Fetch {
        bucket: String,
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to decode {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode {variant} variant: {source}")]
    Encode {
        variant: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to store {bucket}/{key}: {source}")]
    Store {
        bucket: String,
        key: String,
        #[source]
        source: StorageError,
    },
}

impl ProcessError {
    /// Stage name used in logs
    pub fn stage(&self) -> &'static str {
        match self {
            ProcessError::Fetch { .. } => "fetch",
            ProcessError::Decode { .. } => "decode",
            ProcessError::Encode { .. } => "encode",
            ProcessError::Store { .. } => "store",
        }
    }
}

/// Reason a queue message is reported as failed
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Malformed batch: {0}")]
    MalformedBatch(#[from] serde_json::Error),

    #[error("Object {key} too large: {size_bytes} bytes (max {max_bytes})")]
    SizeLimitExceeded {
        key: String,
        size_bytes: i64,
        max_bytes: u64,
    },

    #[error(transparent)]
    Process(#[from] ProcessError),
}

impl BatchError {
    pub fn stage(&self) -> &'static str {
        match self {
            BatchError::MalformedBatch(_) => "parse",
            BatchError::SizeLimitExceeded { .. } => "size_check",
            BatchError::Process(e) => e.stage(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        let fetch = BatchError::from(ProcessError::Fetch {
            bucket: "in".to_string(),
            key: "a.jpg".to_string(),
            source: StorageError::NotFound {
                bucket: "in".to_string(),
                key: "a.jpg".to_string(),
            },
        });
        assert_eq!(fetch.stage(), "fetch");

        let too_big = BatchError::SizeLimitExceeded {
            key: "a.jpg".to_string(),
            size_bytes: 52_428_801,
            max_bytes: 52_428_800,
        };
        assert_eq!(too_big.stage(), "size_check");
        assert_eq!(
            too_big.to_string(),
            "Object a.jpg too large: 52428801 bytes (max 52428800)"
        );
    }
}
