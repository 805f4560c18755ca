//! Image codec adapter - bytes to pixels and back
//!
//! Known extensions get their dedicated decoder; anything else is sniffed from
//! the content using every decoder the `image` crate was built with.

use super::policy::{OutputFormat, SourceFormat};
use image::{DynamicImage, GenericImageView, ImageResult};
use std::io::Cursor;

/// Pixel buffer for one source object plus the format it was decoded as
#[derive(Debug, Clone)]
pub struct DecodedImage {
    image: DynamicImage,
    format: SourceFormat,
}

impl DecodedImage {
    pub fn new(image: DynamicImage, format: SourceFormat) -> Self {
        Self { image, format }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Format the content was decoded as; `Unknown` for sniffed non-PNG/JPEG inputs
    pub fn format(&self) -> SourceFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Decode `data`, using the decoder implied by `hint` or sniffing when it is `Unknown`
pub fn decode(data: &[u8], hint: SourceFormat) -> ImageResult<DecodedImage> {
    match hint.image_format() {
        Some(format) => {
            let image = image::load_from_memory_with_format(data, format)?;
            Ok(DecodedImage::new(image, hint))
        }
        None => {
            let format = image::guess_format(data)?;
            let image = image::load_from_memory_with_format(data, format)?;
            Ok(DecodedImage::new(
                image,
                SourceFormat::from_image_format(format),
            ))
        }
    }
}

/// Encode `image` in the given output format
pub fn encode(image: &DynamicImage, format: OutputFormat) -> ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut cursor = Cursor::new(&mut buf);

    match format {
        OutputFormat::Png => image.write_to(&mut cursor, format.image_output_format())?,
        // JPEG has no alpha channel
        OutputFormat::Jpeg { .. } => DynamicImage::ImageRgb8(image.to_rgb8())
            .write_to(&mut cursor, format.image_output_format())?,
    }

    Ok(buf)
}
