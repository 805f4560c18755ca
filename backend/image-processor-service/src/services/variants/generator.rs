//! Variant generator - resizes a decoded image into one variant and encodes it
//!
//! Images are only ever scaled down, to fit inside the variant's bounding box
//! with the aspect ratio preserved. Resampling uses Lanczos3.

use super::codec::{self, DecodedImage};
use super::policy::{SourceFormat, VariantSpec};
use crate::error::{ProcessError, Result};
use bytes::Bytes;
use image::imageops::FilterType;
use tracing::debug;

/// Encoded variant ready to be stored
#[derive(Debug, Clone)]
pub struct GeneratedVariant {
    pub data: Bytes,
    pub content_type: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Generates one configured variant
#[derive(Debug, Clone)]
pub struct VariantGenerator {
    spec: VariantSpec,
}

impl VariantGenerator {
    pub fn new(spec: VariantSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &VariantSpec {
        &self.spec
    }

    /// Resize `image` to fit the variant's bounds and encode it per the format policy.
    ///
    /// This is CPU-bound; callers on an async runtime run it inline because a
    /// batch is processed strictly sequentially.
    pub fn generate(&self, image: &DecodedImage, source: SourceFormat) -> Result<GeneratedVariant> {
        let (orig_w, orig_h) = image.dimensions();
        let (new_w, new_h) =
            calculate_dimensions(orig_w, orig_h, self.spec.max_width(), self.spec.max_height());

        let output = self.spec.encoding().output_for(source);

        let encoded = if (new_w, new_h) == (orig_w, orig_h) {
            debug!(
                variant = %self.spec.name(),
                width = orig_w,
                height = orig_h,
                "Image already within bounds, encoding as-is"
            );
            codec::encode(image.image(), output)
        } else {
            let resized = image
                .image()
                .resize_exact(new_w, new_h, FilterType::Lanczos3);
            codec::encode(&resized, output)
        };

        let data = encoded.map_err(|source| ProcessError::Encode {
            variant: self.spec.name().to_string(),
            source,
        })?;

        debug!(
            variant = %self.spec.name(),
            width = new_w,
            height = new_h,
            size = data.len(),
            content_type = output.content_type(),
            "Variant generated"
        );

        Ok(GeneratedVariant {
            data: Bytes::from(data),
            content_type: output.content_type(),
            width: new_w,
            height: new_h,
        })
    }
}

/// Largest size fitting inside `max_w x max_h` with the source aspect ratio, never upscaling.
///
/// The tighter of the two bounds is hit exactly; the other side is rounded to
/// the nearest pixel and clamped to at least 1.
pub fn calculate_dimensions(width: u32, height: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if width <= max_w && height <= max_h {
        return (width, height);
    }

    let (w, h) = (width as u64, height as u64);
    let (mw, mh) = (max_w as u64, max_h as u64);

    // w/h >= mw/mh means the width bound is the tighter one
    if w * mh >= h * mw {
        let scaled_h = ((h * mw + w / 2) / w).clamp(1, mh);
        (max_w, scaled_h as u32)
    } else {
        let scaled_w = ((w * mh + h / 2) / h).clamp(1, mw);
        (scaled_w as u32, max_h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::variants::policy::FormatPolicy;
    use image::{DynamicImage, RgbImage};

    fn spec(max_w: u32, max_h: u32) -> VariantSpec {
        VariantSpec::new("test", max_w, max_h, "test", FormatPolicy::default()).unwrap()
    }

    fn decoded(w: u32, h: u32, format: SourceFormat) -> DecodedImage {
        DecodedImage::new(DynamicImage::ImageRgb8(RgbImage::new(w, h)), format)
    }

    #[test]
    fn test_calculate_dimensions_landscape() {
        assert_eq!(calculate_dimensions(1200, 800, 800, 600), (800, 533));
        assert_eq!(calculate_dimensions(1200, 800, 200, 200), (200, 133));
    }

    #[test]
    fn test_calculate_dimensions_portrait() {
        assert_eq!(calculate_dimensions(800, 1200, 800, 600), (400, 600));
        assert_eq!(calculate_dimensions(800, 1200, 200, 200), (133, 200));
    }

    #[test]
    fn test_calculate_dimensions_square() {
        assert_eq!(calculate_dimensions(1000, 1000, 200, 200), (200, 200));
        assert_eq!(calculate_dimensions(1000, 1000, 800, 600), (600, 600));
    }

    #[test]
    fn test_calculate_dimensions_never_upscales() {
        assert_eq!(calculate_dimensions(150, 100, 200, 200), (150, 100));
        assert_eq!(calculate_dimensions(200, 200, 200, 200), (200, 200));
        assert_eq!(calculate_dimensions(1, 1, 800, 600), (1, 1));
    }

    #[test]
    fn test_calculate_dimensions_extreme_ratio_keeps_one_pixel() {
        assert_eq!(calculate_dimensions(10_000, 1, 200, 200), (200, 1));
        assert_eq!(calculate_dimensions(1, 10_000, 200, 200), (1, 200));
    }

    #[test]
    fn test_calculate_dimensions_preserves_aspect_ratio() {
        let boxes = [(200, 200), (800, 600), (640, 480), (100, 300)];
        let sizes = [
            (1000, 1000),
            (1920, 1080),
            (1080, 1920),
            (4032, 3024),
            (333, 777),
            (801, 601),
            (5000, 17),
        ];

        for &(max_w, max_h) in &boxes {
            for &(w, h) in &sizes {
                let (nw, nh) = calculate_dimensions(w, h, max_w, max_h);
                assert!(nw <= max_w && nh <= max_h, "{w}x{h} -> {nw}x{nh} exceeds {max_w}x{max_h}");
                assert!(nw >= 1 && nh >= 1);

                // The derived side is within one pixel of the exact ratio
                let exact_h = nw as f64 * h as f64 / w as f64;
                let exact_w = nh as f64 * w as f64 / h as f64;
                assert!(
                    (nh as f64 - exact_h).abs() <= 1.0 || (nw as f64 - exact_w).abs() <= 1.0,
                    "{w}x{h} -> {nw}x{nh} breaks aspect ratio"
                );
            }
        }
    }

    #[test]
    fn test_generate_resizes_and_encodes_jpeg() {
        let generator = VariantGenerator::new(spec(200, 200));
        let variant = generator
            .generate(&decoded(1000, 500, SourceFormat::Jpeg), SourceFormat::Jpeg)
            .unwrap();

        assert_eq!((variant.width, variant.height), (200, 100));
        assert_eq!(variant.content_type, "image/jpeg");

        let out = image::load_from_memory(&variant.data).unwrap();
        assert_eq!((out.width(), out.height()), (200, 100));
    }

    #[test]
    fn test_generate_keeps_png() {
        let generator = VariantGenerator::new(spec(200, 200));
        let variant = generator
            .generate(&decoded(300, 300, SourceFormat::Png), SourceFormat::Png)
            .unwrap();

        assert_eq!(variant.content_type, "image/png");
        assert_eq!(
            image::guess_format(&variant.data).unwrap(),
            image::ImageFormat::Png
        );
    }

    #[test]
    fn test_generate_small_image_is_not_upscaled() {
        let generator = VariantGenerator::new(spec(800, 600));
        let variant = generator
            .generate(&decoded(120, 90, SourceFormat::Unknown), SourceFormat::Unknown)
            .unwrap();

        assert_eq!((variant.width, variant.height), (120, 90));
        assert_eq!(variant.content_type, "image/jpeg");
    }
}
