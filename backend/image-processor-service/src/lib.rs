//! Image Processor Service
//!
//! Consumes batches of S3 "object created" notifications delivered through a
//! queue, generates a thumbnail and a medium variant of every changed image,
//! and reports failures per message so only failed messages are redelivered.

pub mod batch;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

// Public re-exports
pub use batch::BatchProcessor;
pub use config::Config;
pub use error::{BatchError, ConfigError, ProcessError, Result, StorageError};
pub use models::{BatchResult, ChangeBatchMessage, ChangeRecord, ProcessOutcome};
