use image::ImageFormat;

use super::{Image, LoadError};

/// A format-specific "decode to RGBA8" strategy.
pub trait Decoder: Send + Sync {
    /// Short format name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Lowercase file extensions this decoder claims.
    fn extensions(&self) -> &'static [&'static str];

    /// Whether `bytes` start like a file of this format.
    fn sniff(&self, bytes: &[u8]) -> bool;

    fn decode(&self, bytes: &[u8]) -> Result<Image, LoadError>;
}

/// PNG, alpha preserved.
#[derive(Debug, Default, Copy, Clone)]
pub struct PngDecoder;

/// Baseline/progressive JPEG; alpha is opaque.
#[derive(Debug, Default, Copy, Clone)]
pub struct JpegDecoder;

/// TIFF, converted to RGBA8 whatever the stored sample layout.
#[derive(Debug, Default, Copy, Clone)]
pub struct TiffDecoder;

macro_rules! image_crate_decoder {
    ($ty:ty, $name:literal, $format:expr, [$($ext:literal),+]) => {
        impl Decoder for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn extensions(&self) -> &'static [&'static str] {
                &[$($ext),+]
            }

            fn sniff(&self, bytes: &[u8]) -> bool {
                image::guess_format(bytes).is_ok_and(|f| f == $format)
            }

            fn decode(&self, bytes: &[u8]) -> Result<Image, LoadError> {
                decode_with(bytes, $format, $name)
            }
        }
    };
}

image_crate_decoder!(PngDecoder, "png", ImageFormat::Png, ["png"]);
image_crate_decoder!(JpegDecoder, "jpeg", ImageFormat::Jpeg, ["jpg", "jpeg", "jpe", "jfif"]);
image_crate_decoder!(TiffDecoder, "tiff", ImageFormat::Tiff, ["tif", "tiff"]);

fn decode_with(bytes: &[u8], format: ImageFormat, name: &'static str) -> Result<Image, LoadError> {
    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| LoadError::decode(name, e.to_string()))?;

    log::debug!(
        "{name}: {}x{} {:?} -> rgba8",
        decoded.width(),
        decoded.height(),
        decoded.color()
    );

    Image::from_rgba8(decoded.into_rgba8())
        .ok_or_else(|| LoadError::decode(name, "image has zero width or height"))
}
