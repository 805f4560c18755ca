//! Image Processor - queue invocation adapter
//!
//! Reads one SQS batch event (JSON) from stdin, generates image variants for
//! every S3 notification it carries, and writes the partial batch response
//! (`{"batchItemFailures": [...]}`) to stdout. Logs go to stderr.
//!
//! Environment variables:
//! - OUTPUT_BUCKET: bucket receiving variants (default: "image-processor-out")
//! - MAX_OBJECT_SIZE_BYTES: size gate (default: 52428800)
//! - JPEG_QUALITY: JPEG quality 1-100 (default: 85)
//! - THUMBNAIL_MAX_WIDTH / THUMBNAIL_MAX_HEIGHT (default: 200 / 200)
//! - MEDIUM_MAX_WIDTH / MEDIUM_MAX_HEIGHT (default: 800 / 600)
//! - AWS_REGION, S3_ENDPOINT, S3_FORCE_PATH_STYLE: S3 connection
//! - LOG_FORMAT: "json" for JSON lines, anything else for text
//! - RUST_LOG: log filter

use anyhow::Context;
use event_schema::SqsBatchEvent;
use image_processor_service::services::{ImagePipeline, ObjectStore};
use image_processor_service::{BatchProcessor, Config};
use s3_utils::S3Client;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("image_processor=info,image_processor_service=info,s3_utils=info")
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        output_bucket = %config.processing.output_bucket,
        max_object_size_bytes = config.processing.max_object_size_bytes,
        region = %config.s3.region,
        "Configuration loaded"
    );

    let s3 = S3Client::with_config(config.s3.clone()).await;
    let store: Arc<dyn ObjectStore> = Arc::new(s3.operations());

    let pipeline = ImagePipeline::new(
        store,
        config.processing.output_bucket.clone(),
        config.processing.variants.clone(),
    );
    for spec in pipeline.variants() {
        info!(
            variant = %spec.name(),
            max_width = spec.max_width(),
            max_height = spec.max_height(),
            prefix = %spec.output_key_prefix(),
            output_bucket = %pipeline.output_bucket(),
            "Variant configured"
        );
    }
    let processor = BatchProcessor::new(pipeline, config.processing.max_object_size_bytes);

    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("Failed to read invocation event from stdin")?;
    let event: SqsBatchEvent =
        serde_json::from_str(&input).context("Invocation event is not an SQS batch event")?;

    let response = processor.handle_event(event).await;
    println!(
        "{}",
        serde_json::to_string(&response).context("Failed to serialize batch response")?
    );

    Ok(())
}
