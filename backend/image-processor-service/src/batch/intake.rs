//! Batch intake loop
//!
//! Messages are processed one after another in arrival order. A failure is
//! confined to its own message: it marks that message failed, stops work on
//! its remaining records, and the loop moves on to the next message.

use super::parser::parse_change_batch;
use crate::error::BatchError;
use crate::models::{BatchResult, ChangeBatchMessage, ChangeRecord};
use crate::services::ImagePipeline;
use event_schema::{SqsBatchEvent, SqsBatchResponse};
use tracing::{error, info, warn};

/// Runs the image pipeline over a batch and collects per-message failures
pub struct BatchProcessor {
    pipeline: ImagePipeline,
    max_object_size_bytes: u64,
}

impl BatchProcessor {
    pub fn new(pipeline: ImagePipeline, max_object_size_bytes: u64) -> Self {
        Self {
            pipeline,
            max_object_size_bytes,
        }
    }

    /// Handle one queue invocation and build its partial batch response
    pub async fn handle_event(&self, event: SqsBatchEvent) -> SqsBatchResponse {
        let messages: Vec<ChangeBatchMessage> =
            event.records.into_iter().map(ChangeBatchMessage::from).collect();

        self.process_batch(&messages).await.to_response()
    }

    /// Process every message; the result lists the ones to redeliver
    pub async fn process_batch(&self, messages: &[ChangeBatchMessage]) -> BatchResult {
        info!(count = messages.len(), "Received batch");

        let mut result = BatchResult::new();

        for (i, message) in messages.iter().enumerate() {
            info!(
                index = i + 1,
                total = messages.len(),
                message_id = %message.message_id,
                "Processing message"
            );

            match self.process_message(message).await {
                Ok(records) => {
                    info!(
                        message_id = %message.message_id,
                        records,
                        "Message processed"
                    );
                }
                Err(e) => {
                    error!(
                        message_id = %message.message_id,
                        stage = e.stage(),
                        error = %e,
                        "Message failed"
                    );
                    result.mark_failed(message.message_id.clone());
                }
            }
        }

        if result.is_success() {
            info!(total = messages.len(), "All messages processed successfully");
        } else {
            warn!(
                failed = result.failed_count(),
                total = messages.len(),
                "Messages failed and will be retried"
            );
        }

        result
    }

    /// Process one message's records in order, stopping at the first failure
    async fn process_message(&self, message: &ChangeBatchMessage) -> Result<usize, BatchError> {
        let records = parse_change_batch(&message.body)?;

        for record in &records {
            self.check_size(record)?;

            info!(
                bucket = %record.bucket,
                key = %record.key,
                event_name = record.event_name.as_deref().unwrap_or("unknown"),
                size_bytes = record.size_bytes,
                size_kb = %format!("{:.2}", record.size_bytes as f64 / 1024.0),
                "Processing change record"
            );

            let outcome = self.pipeline.process(&record.bucket, &record.key).await?;

            info!(
                original_key = %outcome.original_key,
                variants = ?outcome.variant_keys,
                "Image processed"
            );
        }

        Ok(records.len())
    }

    fn check_size(&self, record: &ChangeRecord) -> Result<(), BatchError> {
        let too_large = u64::try_from(record.size_bytes)
            .map(|size| size > self.max_object_size_bytes)
            .unwrap_or(false);

        if too_large {
            return Err(BatchError::SizeLimitExceeded {
                key: record.key.clone(),
                size_bytes: record.size_bytes,
                max_bytes: self.max_object_size_bytes,
            });
        }

        Ok(())
    }
}
