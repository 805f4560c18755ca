/// S3 object operations used by the image worker
use crate::config::S3Config;
use crate::error::{S3Error, S3Result};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;

/// Object body plus the content type S3 reported for it
#[derive(Debug, Clone)]
pub struct S3Object {
    pub body: Bytes,
    pub content_type: Option<String>,
}

#[derive(Clone)]
pub struct S3Operations {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Operations {
    pub fn new(client: Arc<Client>, config: S3Config) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// Download an object and its content type
    pub async fn get_object(&self, bucket: &str, key: &str) -> S3Result<S3Object> {
        debug!(bucket = %bucket, key = %key, "Downloading from S3");

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let no_such_key = e
                    .as_service_error()
                    .map(|service_err| service_err.is_no_such_key())
                    .unwrap_or(false);
                if no_such_key {
                    S3Error::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    S3Error::Request {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                        message: DisplayErrorContext(&e).to_string(),
                    }
                }
            })?;

        let content_type = response.content_type().map(|s| s.to_string());
        let body = response
            .body
            .collect()
            .await
            .map_err(|e| S3Error::Body {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: e.to_string(),
            })?
            .into_bytes();

        debug!(
            bucket = %bucket,
            key = %key,
            size = body.len(),
            content_type = content_type.as_deref().unwrap_or("unknown"),
            "Downloaded from S3"
        );

        Ok(S3Object { body, content_type })
    }

    /// Upload an object with the given content type, overwriting any existing one
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> S3Result<()> {
        let size = body.len();

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| S3Error::Request {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        debug!(
            url = %self.config.object_url(bucket, key),
            size,
            content_type = %content_type,
            "Uploaded to S3"
        );

        Ok(())
    }
}
