//! Variant policy - static description of every variant the worker produces
//!
//! A variant is a bounding box, an output key prefix and an encoding rule.
//! The input format is resolved once per record into a [`SourceFormat`] and
//! the rule maps it to exactly one [`OutputFormat`].

use crate::error::ConfigError;
use image::{ImageFormat, ImageOutputFormat};
use std::path::Path;

pub const DEFAULT_MAX_OBJECT_SIZE_BYTES: u64 = 50 * 1024 * 1024;
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

pub const THUMBNAIL_VARIANT: &str = "thumbnail";
pub const THUMBNAIL_PREFIX: &str = "thumbnails";
pub const THUMBNAIL_MAX_WIDTH: u32 = 200;
pub const THUMBNAIL_MAX_HEIGHT: u32 = 200;

pub const MEDIUM_VARIANT: &str = "medium";
pub const MEDIUM_PREFIX: &str = "medium";
pub const MEDIUM_MAX_WIDTH: u32 = 800;
pub const MEDIUM_MAX_HEIGHT: u32 = 600;

/// Format of the source image as far as the encoding rule is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Png,
    Jpeg,
    Unknown,
}

impl SourceFormat {
    /// Format implied by the key's extension (case-insensitive)
    pub fn from_key(key: &str) -> Self {
        let ext = Path::new(key)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match ext.as_deref() {
            Some("png") => SourceFormat::Png,
            Some("jpg") | Some("jpeg") => SourceFormat::Jpeg,
            _ => SourceFormat::Unknown,
        }
    }

    pub fn from_image_format(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Png => SourceFormat::Png,
            ImageFormat::Jpeg => SourceFormat::Jpeg,
            _ => SourceFormat::Unknown,
        }
    }

    /// Decoder to force for this format, `None` means sniff the content
    pub fn image_format(self) -> Option<ImageFormat> {
        match self {
            SourceFormat::Png => Some(ImageFormat::Png),
            SourceFormat::Jpeg => Some(ImageFormat::Jpeg),
            SourceFormat::Unknown => None,
        }
    }

    /// Combine the decoded format with the content type reported by storage.
    ///
    /// Either source mentioning PNG wins, so a PNG input is never re-encoded lossily.
    pub fn resolve(detected: SourceFormat, content_type: Option<&str>) -> Self {
        let content_type = content_type.map(|ct| ct.to_ascii_lowercase());
        let mentions = |needle: &str| {
            content_type
                .as_deref()
                .map(|ct| ct.contains(needle))
                .unwrap_or(false)
        };

        if detected == SourceFormat::Png || mentions("png") {
            SourceFormat::Png
        } else if detected == SourceFormat::Jpeg || mentions("jpeg") || mentions("jpg") {
            SourceFormat::Jpeg
        } else {
            SourceFormat::Unknown
        }
    }
}

/// Encoding chosen for a variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg { quality: u8 },
}

impl OutputFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg { .. } => "image/jpeg",
        }
    }

    pub fn image_output_format(&self) -> ImageOutputFormat {
        match self {
            OutputFormat::Png => ImageOutputFormat::Png,
            OutputFormat::Jpeg { quality } => ImageOutputFormat::Jpeg(*quality),
        }
    }
}

/// PNG stays PNG, everything else becomes JPEG at a fixed quality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatPolicy {
    jpeg_quality: u8,
}

impl FormatPolicy {
    pub fn new(jpeg_quality: u8) -> Result<Self, ConfigError> {
        if !(1..=100).contains(&jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "JPEG quality must be between 1 and 100, got {jpeg_quality}"
            )));
        }
        Ok(Self { jpeg_quality })
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    pub fn output_for(&self, source: SourceFormat) -> OutputFormat {
        match source {
            SourceFormat::Png => OutputFormat::Png,
            SourceFormat::Jpeg | SourceFormat::Unknown => OutputFormat::Jpeg {
                quality: self.jpeg_quality,
            },
        }
    }
}

impl Default for FormatPolicy {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// One output variant: bounding box, key prefix and encoding rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSpec {
    name: String,
    max_width: u32,
    max_height: u32,
    output_key_prefix: String,
    encoding: FormatPolicy,
}

impl VariantSpec {
    pub fn new(
        name: impl Into<String>,
        max_width: u32,
        max_height: u32,
        output_key_prefix: impl Into<String>,
        encoding: FormatPolicy,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if max_width == 0 || max_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "variant {name} must have non-zero bounds, got {max_width}x{max_height}"
            )));
        }

        let output_key_prefix = output_key_prefix.into().trim_end_matches('/').to_string();
        if output_key_prefix.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "variant {name} must have an output key prefix"
            )));
        }

        Ok(Self {
            name,
            max_width,
            max_height,
            output_key_prefix,
            encoding,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_width(&self) -> u32 {
        self.max_width
    }

    pub fn max_height(&self) -> u32 {
        self.max_height
    }

    pub fn output_key_prefix(&self) -> &str {
        &self.output_key_prefix
    }

    pub fn encoding(&self) -> FormatPolicy {
        self.encoding
    }

    /// `{prefix}/{key}`, with the source key kept verbatim
    pub fn output_key(&self, key: &str) -> String {
        format!("{}/{}", self.output_key_prefix, key)
    }
}
