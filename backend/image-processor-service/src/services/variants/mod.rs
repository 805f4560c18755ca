//! Variant generation
//!
//! - Policy: bounding boxes, key prefixes and the PNG/JPEG encoding rule
//! - Codec: decoding source bytes and encoding variants
//! - Generator: aspect-preserving Lanczos3 downscale plus encoding

pub mod codec;
pub mod generator;
pub mod policy;

pub use codec::DecodedImage;
pub use generator::{calculate_dimensions, GeneratedVariant, VariantGenerator};
pub use policy::{FormatPolicy, OutputFormat, SourceFormat, VariantSpec};
