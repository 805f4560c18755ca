//! Image pipeline - produces every configured variant for one source object
//!
//! 1. Fetch the original from storage
//! 2. Decode it (extension first, content sniffing otherwise)
//! 3. Generate each variant in configuration order
//! 4. Store each variant under `{prefix}/{key}` in the output bucket
//!
//! Variants stored before a failing one are left in place; a retry
//! overwrites them. The original object is never modified.

use super::storage::ObjectStore;
use super::variants::{codec, SourceFormat, VariantGenerator, VariantSpec};
use crate::error::{ProcessError, Result};
use crate::models::ProcessOutcome;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

pub struct ImagePipeline {
    store: Arc<dyn ObjectStore>,
    output_bucket: String,
    generators: Vec<VariantGenerator>,
}

impl ImagePipeline {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        output_bucket: impl Into<String>,
        variants: Vec<VariantSpec>,
    ) -> Self {
        Self {
            store,
            output_bucket: output_bucket.into(),
            generators: variants.into_iter().map(VariantGenerator::new).collect(),
        }
    }

    pub fn output_bucket(&self) -> &str {
        &self.output_bucket
    }

    pub fn variants(&self) -> impl Iterator<Item = &VariantSpec> {
        self.generators.iter().map(VariantGenerator::spec)
    }

    /// Run the full pipeline for `bucket/key`
    pub async fn process(&self, bucket: &str, key: &str) -> Result<ProcessOutcome> {
        info!(bucket = %bucket, key = %key, "Processing image");

        let original = self
            .store
            .fetch(bucket, key)
            .await
            .map_err(|source| ProcessError::Fetch {
                bucket: bucket.to_string(),
                key: key.to_string(),
                source,
            })?;

        let decoded = codec::decode(&original.data, SourceFormat::from_key(key)).map_err(
            |source| ProcessError::Decode {
                key: key.to_string(),
                source,
            },
        )?;

        let source_format =
            SourceFormat::resolve(decoded.format(), original.content_type.as_deref());

        debug!(
            key = %key,
            width = decoded.width(),
            height = decoded.height(),
            format = ?source_format,
            content_type = original.content_type.as_deref().unwrap_or("unknown"),
            "Decoded original image"
        );

        let mut variant_keys = BTreeMap::new();
        for generator in &self.generators {
            let spec = generator.spec();
            let variant = generator.generate(&decoded, source_format)?;
            let output_key = spec.output_key(key);
            let size = variant.data.len();

            self.store
                .store(
                    &self.output_bucket,
                    &output_key,
                    variant.data,
                    variant.content_type,
                )
                .await
                .map_err(|source| ProcessError::Store {
                    bucket: self.output_bucket.clone(),
                    key: output_key.clone(),
                    source,
                })?;

            info!(
                variant = %spec.name(),
                output_key = %output_key,
                width = variant.width,
                height = variant.height,
                size,
                "Variant stored"
            );

            variant_keys.insert(spec.name().to_string(), output_key);
        }

        Ok(ProcessOutcome {
            original_key: key.to_string(),
            variant_keys,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::services::storage::InMemoryObjectStore;
    use crate::services::variants::FormatPolicy;
    use image::{DynamicImage, ImageOutputFormat, RgbImage};
    use std::io::Cursor;

    fn encoded(w: u32, h: u32, format: ImageOutputFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, image::Rgb([200, 100, 50])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    fn variants() -> Vec<VariantSpec> {
        vec![
            VariantSpec::new("thumbnail", 200, 200, "thumbnails", FormatPolicy::default()).unwrap(),
            VariantSpec::new("medium", 800, 600, "medium", FormatPolicy::default()).unwrap(),
        ]
    }

    fn pipeline(store: Arc<InMemoryObjectStore>) -> ImagePipeline {
        ImagePipeline::new(store, "out", variants())
    }

    #[tokio::test]
    async fn test_process_stores_both_variants() {
        let store = Arc::new(InMemoryObjectStore::new());
        store.insert(
            "in",
            "photos/wide.jpg",
            encoded(1600, 900, ImageOutputFormat::Jpeg(90)),
            Some("image/jpeg"),
        );

        let outcome = pipeline(store.clone())
            .process("in", "photos/wide.jpg")
            .await
            .unwrap();

        assert_eq!(outcome.original_key, "photos/wide.jpg");
        assert_eq!(
            outcome.variant_keys.get("thumbnail").map(String::as_str),
            Some("thumbnails/photos/wide.jpg")
        );
        assert_eq!(
            outcome.variant_keys.get("medium").map(String::as_str),
            Some("medium/photos/wide.jpg")
        );

        let thumb = store.get("out", "thumbnails/photos/wide.jpg").unwrap();
        assert_eq!(thumb.content_type.as_deref(), Some("image/jpeg"));
        let thumb = image::load_from_memory(&thumb.data).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (200, 113));

        let medium = store.get("out", "medium/photos/wide.jpg").unwrap();
        let medium = image::load_from_memory(&medium.data).unwrap();
        assert_eq!((medium.width(), medium.height()), (800, 450));

        // Original untouched
        assert!(store.get("in", "photos/wide.jpg").is_some());
        assert_eq!(store.stores().len(), 2);
    }

    #[tokio::test]
    async fn test_png_input_yields_png_variants() {
        let store = Arc::new(InMemoryObjectStore::new());
        store.insert("in", "logo.PNG", encoded(400, 400, ImageOutputFormat::Png), None);

        pipeline(store.clone()).process("in", "logo.PNG").await.unwrap();

        for key in ["thumbnails/logo.PNG", "medium/logo.PNG"] {
            let object = store.get("out", key).unwrap();
            assert_eq!(object.content_type.as_deref(), Some("image/png"));
            assert_eq!(
                image::guess_format(&object.data).unwrap(),
                image::ImageFormat::Png
            );
        }
    }

    #[tokio::test]
    async fn test_extensionless_key_is_sniffed() {
        let store = Arc::new(InMemoryObjectStore::new());
        store.insert("in", "uploads/blob", encoded(300, 300, ImageOutputFormat::Png), None);

        pipeline(store.clone()).process("in", "uploads/blob").await.unwrap();

        let object = store.get("out", "thumbnails/uploads/blob").unwrap();
        assert_eq!(object.content_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn test_missing_object_is_fetch_error() {
        let store = Arc::new(InMemoryObjectStore::new());

        let err = pipeline(store).process("in", "nope.jpg").await.unwrap_err();
        assert!(matches!(
            err,
            ProcessError::Fetch {
                source: StorageError::NotFound { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_undecodable_object_is_decode_error() {
        let store = Arc::new(InMemoryObjectStore::new());
        store.insert("in", "notes.txt", b"hello".to_vec(), Some("text/plain"));

        let err = pipeline(store.clone()).process("in", "notes.txt").await.unwrap_err();
        assert_eq!(err.stage(), "decode");
        assert!(store.stores().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_keeps_earlier_variants() {
        let store = Arc::new(InMemoryObjectStore::new());
        store.insert("in", "a.jpg", encoded(1000, 1000, ImageOutputFormat::Jpeg(90)), None);
        store.fail_store_for("medium/a.jpg");

        let err = pipeline(store.clone()).process("in", "a.jpg").await.unwrap_err();
        assert!(matches!(err, ProcessError::Store { ref key, .. } if key == "medium/a.jpg"));
        assert!(store.get("out", "thumbnails/a.jpg").is_some());
        assert!(store.get("out", "medium/a.jpg").is_none());
    }
}
