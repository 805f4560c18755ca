/// Configuration management for the image processor
///
/// Read once at process start. Defaults are applied here and nowhere else;
/// the pipeline receives fully resolved values.
use crate::error::ConfigError;
use crate::services::variants::policy::{
    FormatPolicy, VariantSpec, DEFAULT_JPEG_QUALITY, DEFAULT_MAX_OBJECT_SIZE_BYTES,
    MEDIUM_MAX_HEIGHT, MEDIUM_MAX_WIDTH, MEDIUM_PREFIX, MEDIUM_VARIANT, THUMBNAIL_MAX_HEIGHT,
    THUMBNAIL_MAX_WIDTH, THUMBNAIL_PREFIX, THUMBNAIL_VARIANT,
};
use s3_utils::S3Config;
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_OUTPUT_BUCKET: &str = "image-processor-out";

#[derive(Clone, Debug)]
pub struct Config {
    pub processing: ProcessingConfig,
    pub s3: S3Config,
}

#[derive(Clone, Debug)]
pub struct ProcessingConfig {
    /// Bucket receiving every variant
    pub output_bucket: String,
    /// Records declaring a larger size are rejected before any fetch
    pub max_object_size_bytes: u64,
    /// Variants in generation order
    pub variants: Vec<VariantSpec>,
}

/// Raw environment, every variable optional
#[derive(Debug, Default, Deserialize)]
struct RawEnv {
    output_bucket: Option<String>,
    max_object_size_bytes: Option<u64>,
    jpeg_quality: Option<u8>,
    thumbnail_max_width: Option<u32>,
    thumbnail_max_height: Option<u32>,
    medium_max_width: Option<u32>,
    medium_max_height: Option<u32>,
    aws_region: Option<String>,
    s3_endpoint: Option<String>,
    s3_force_path_style: Option<bool>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of `(NAME, value)` pairs
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let raw: RawEnv = envy::from_iter(vars)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawEnv) -> Result<Self, ConfigError> {
        let output_bucket = match raw.output_bucket.map(|b| b.trim().to_string()) {
            Some(bucket) if !bucket.is_empty() => bucket,
            Some(_) => {
                return Err(ConfigError::Invalid(
                    "OUTPUT_BUCKET must not be empty".to_string(),
                ))
            }
            None => {
                warn!(
                    output_bucket = DEFAULT_OUTPUT_BUCKET,
                    "OUTPUT_BUCKET not set, using default"
                );
                DEFAULT_OUTPUT_BUCKET.to_string()
            }
        };

        let max_object_size_bytes = raw
            .max_object_size_bytes
            .unwrap_or(DEFAULT_MAX_OBJECT_SIZE_BYTES);
        if max_object_size_bytes == 0 {
            return Err(ConfigError::Invalid(
                "MAX_OBJECT_SIZE_BYTES must be greater than zero".to_string(),
            ));
        }

        let encoding = FormatPolicy::new(raw.jpeg_quality.unwrap_or(DEFAULT_JPEG_QUALITY))?;
        let variants = vec![
            VariantSpec::new(
                THUMBNAIL_VARIANT,
                raw.thumbnail_max_width.unwrap_or(THUMBNAIL_MAX_WIDTH),
                raw.thumbnail_max_height.unwrap_or(THUMBNAIL_MAX_HEIGHT),
                THUMBNAIL_PREFIX,
                encoding,
            )?,
            VariantSpec::new(
                MEDIUM_VARIANT,
                raw.medium_max_width.unwrap_or(MEDIUM_MAX_WIDTH),
                raw.medium_max_height.unwrap_or(MEDIUM_MAX_HEIGHT),
                MEDIUM_PREFIX,
                encoding,
            )?,
        ];

        Ok(Config {
            processing: ProcessingConfig {
                output_bucket,
                max_object_size_bytes,
                variants,
            },
            s3: S3Config {
                region: raw.aws_region.unwrap_or_else(|| "us-east-1".to_string()),
                endpoint: raw.s3_endpoint.filter(|e| !e.trim().is_empty()),
                force_path_style: raw.s3_force_path_style.unwrap_or(false),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(Vec::new()).unwrap();

        assert_eq!(config.processing.output_bucket, "image-processor-out");
        assert_eq!(config.processing.max_object_size_bytes, 52_428_800);
        assert_eq!(config.s3, S3Config::default());

        let variants = &config.processing.variants;
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].name(), "thumbnail");
        assert_eq!((variants[0].max_width(), variants[0].max_height()), (200, 200));
        assert_eq!(variants[0].output_key_prefix(), "thumbnails");
        assert_eq!(variants[1].name(), "medium");
        assert_eq!((variants[1].max_width(), variants[1].max_height()), (800, 600));
        assert_eq!(variants[1].output_key_prefix(), "medium");
        assert_eq!(variants[1].encoding().jpeg_quality(), 85);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(vars(&[
            ("OUTPUT_BUCKET", "variants"),
            ("MAX_OBJECT_SIZE_BYTES", "1024"),
            ("JPEG_QUALITY", "70"),
            ("THUMBNAIL_MAX_WIDTH", "128"),
            ("MEDIUM_MAX_HEIGHT", "480"),
            ("AWS_REGION", "eu-central-1"),
            ("S3_ENDPOINT", "http://localhost:4566"),
            ("S3_FORCE_PATH_STYLE", "true"),
            ("UNRELATED", "ignored"),
        ]))
        .unwrap();

        assert_eq!(config.processing.output_bucket, "variants");
        assert_eq!(config.processing.max_object_size_bytes, 1024);
        let variants = &config.processing.variants;
        assert_eq!((variants[0].max_width(), variants[0].max_height()), (128, 200));
        assert_eq!((variants[1].max_width(), variants[1].max_height()), (800, 480));
        assert_eq!(variants[0].encoding().jpeg_quality(), 70);
        assert_eq!(config.s3.region, "eu-central-1");
        assert_eq!(config.s3.endpoint.as_deref(), Some("http://localhost:4566"));
        assert!(config.s3.force_path_style);
    }

    #[test]
    fn test_invalid_values() {
        for pairs in [
            vec![("THUMBNAIL_MAX_WIDTH", "0")],
            vec![("MEDIUM_MAX_HEIGHT", "0")],
            vec![("JPEG_QUALITY", "0")],
            vec![("MAX_OBJECT_SIZE_BYTES", "0")],
            vec![("OUTPUT_BUCKET", "  ")],
        ] {
            let err = Config::from_vars(vars(&pairs)).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{pairs:?} -> {err}");
        }
    }

    #[test]
    fn test_unparseable_number() {
        let err = Config::from_vars(vars(&[("JPEG_QUALITY", "high")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env(_)));
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env() {
        std::env::set_var("OUTPUT_BUCKET", "env-bucket");
        std::env::set_var("MAX_OBJECT_SIZE_BYTES", "2048");

        let config = Config::from_env().unwrap();
        assert_eq!(config.processing.output_bucket, "env-bucket");
        assert_eq!(config.processing.max_object_size_bytes, 2048);

        std::env::remove_var("OUTPUT_BUCKET");
        std::env::remove_var("MAX_OBJECT_SIZE_BYTES");
    }
}
