//! Image loading.
//!
//! `ImageLoader` reads a file and hands the bytes to one of its registered
//! [`Decoder`] strategies. Every decoder produces the same thing: a tightly
//! packed RGBA8 [`Image`].
//!
//! Strategy selection: the file extension first, then magic-byte sniffing
//! when the extension is missing, unknown, or disagrees with the contents.

mod decoder;
mod error;
mod rgba;

pub use decoder::{Decoder, JpegDecoder, PngDecoder, TiffDecoder};
pub use error::LoadError;
pub use rgba::Image;

use std::path::Path;

/// File → RGBA8 image, with swappable format decoders.
pub struct ImageLoader {
    decoders: Vec<Box<dyn Decoder>>,
}

impl ImageLoader {
    /// A loader for PNG, JPEG and TIFF.
    pub fn new() -> Self {
        Self::empty()
            .with_decoder(PngDecoder)
            .with_decoder(JpegDecoder)
            .with_decoder(TiffDecoder)
    }

    /// A loader without decoders; every load fails with `UnsupportedFormat`.
    pub fn empty() -> Self {
        Self { decoders: Vec::new() }
    }

    /// Registers a decoder. Later registrations win extension ties.
    pub fn with_decoder(mut self, decoder: impl Decoder + 'static) -> Self {
        self.decoders.insert(0, Box::new(decoder));
        self
    }

    /// Names of the registered decoders, highest priority first.
    pub fn formats(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.decoders.iter().map(|d| d.name())
    }

    /// Reads and decodes the file at `path`.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Image, LoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| LoadError::from_io(path, e))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let image = self.decode(&bytes, extension.as_deref())?;
        log::info!(
            "loaded {} ({}x{}, {} bytes on disk)",
            path.display(),
            image.width(),
            image.height(),
            bytes.len()
        );
        Ok(image)
    }

    /// Decodes in-memory file contents. `extension` is a lowercase hint.
    pub fn decode(&self, bytes: &[u8], extension: Option<&str>) -> Result<Image, LoadError> {
        let decoder = self.select(bytes, extension).ok_or_else(|| {
            LoadError::UnsupportedFormat(match extension {
                Some(ext) => format!("no decoder for .{ext} files"),
                None => "unrecognized file contents".to_string(),
            })
        })?;

        log::debug!("decoding with {} decoder", decoder.name());
        decoder.decode(bytes)
    }

    fn select(&self, bytes: &[u8], extension: Option<&str>) -> Option<&dyn Decoder> {
        let by_ext = extension.and_then(|ext| {
            self.decoders
                .iter()
                .find(|d| d.extensions().contains(&ext))
                .map(|d| d.as_ref())
        });
        let by_magic = self.decoders.iter().find(|d| d.sniff(bytes)).map(|d| d.as_ref());

        match (by_ext, by_magic) {
            (Some(ext), Some(magic)) if !ext.sniff(bytes) => {
                log::warn!(
                    "file extension says {} but contents look like {}",
                    ext.name(),
                    magic.name()
                );
                Some(magic)
            }
            (Some(ext), _) => Some(ext),
            (None, magic) => magic,
        }
    }
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::path::PathBuf;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    use super::*;

    fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    fn rgba(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(w, h, |x, y| {
            Rgba([x as u8 * 10, y as u8 * 10, 7, 128])
        }))
    }

    fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("tilescope-{}-{name}", std::process::id()));
        std::fs::write(&path, bytes).unwrap();
        path
    }

    // ── formats ───────────────────────────────────────────────────────────

    #[test]
    fn png_keeps_alpha() {
        let bytes = encode(rgba(5, 3), ImageFormat::Png);
        let img = ImageLoader::new().decode(&bytes, Some("png")).unwrap();
        assert_eq!(img.size(), (5, 3));
        assert_eq!(img.pixels().len(), 5 * 3 * 4);
        assert_eq!(&img.pixels()[4..8], &[10, 0, 7, 128]);
    }

    #[test]
    fn jpeg_gets_opaque_alpha() {
        let src = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([200, 100, 50])));
        let bytes = encode(src, ImageFormat::Jpeg);
        let img = ImageLoader::new().decode(&bytes, Some("jpg")).unwrap();
        assert_eq!(img.size(), (8, 8));
        assert!(img.pixels().chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test]
    fn tiff_is_converted_to_rgba() {
        let bytes = encode(rgba(4, 4), ImageFormat::Tiff);
        let img = ImageLoader::new().decode(&bytes, Some("tiff")).unwrap();
        assert_eq!(img.size(), (4, 4));
        assert_eq!(img.pixels().len(), 64);
    }

    #[test]
    fn missing_extension_falls_back_to_magic_bytes() {
        let bytes = encode(rgba(2, 2), ImageFormat::Png);
        let img = ImageLoader::new().decode(&bytes, None).unwrap();
        assert_eq!(img.size(), (2, 2));
    }

    #[test]
    fn contents_win_over_misleading_extension() {
        let bytes = encode(rgba(2, 2), ImageFormat::Png);
        let img = ImageLoader::new().decode(&bytes, Some("tif")).unwrap();
        assert_eq!(img.size(), (2, 2));
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn missing_file_is_file_not_found() {
        let err = ImageLoader::new().load("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound(_)), "{err}");
    }

    #[test]
    fn unknown_extension_and_contents_is_unsupported() {
        let path = temp_file("notes.txt", b"just some text");
        let err = ImageLoader::new().load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, LoadError::UnsupportedFormat(_)), "{err}");
    }

    #[test]
    fn truncated_png_is_decode_failure() {
        let mut bytes = encode(rgba(16, 16), ImageFormat::Png);
        bytes.truncate(bytes.len() / 2);
        let err = ImageLoader::new().decode(&bytes, Some("png")).unwrap_err();
        assert!(matches!(err, LoadError::DecodeFailure { format: "png", .. }), "{err}");
    }

    #[test]
    fn empty_loader_supports_nothing() {
        let bytes = encode(rgba(2, 2), ImageFormat::Png);
        let err = ImageLoader::empty().decode(&bytes, Some("png")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(_)));
    }

    // ── files ─────────────────────────────────────────────────────────────

    #[test]
    fn load_reads_from_disk_with_uppercase_extension() {
        let path = temp_file("IMAGE.PNG", &encode(rgba(6, 2), ImageFormat::Png));
        let img = ImageLoader::new().load(&path);
        std::fs::remove_file(&path).ok();
        assert_eq!(img.unwrap().size(), (6, 2));
    }

    #[test]
    fn custom_decoder_takes_priority() {
        struct Solid;
        impl Decoder for Solid {
            fn name(&self) -> &'static str { "solid" }
            fn extensions(&self) -> &'static [&'static str] { &["png"] }
            fn sniff(&self, _: &[u8]) -> bool { true }
            fn decode(&self, _: &[u8]) -> Result<Image, LoadError> {
                Ok(Image::from_rgba8(RgbaImage::new(1, 1)).unwrap())
            }
        }

        let loader = ImageLoader::new().with_decoder(Solid);
        assert_eq!(loader.formats().next(), Some("solid"));
        let img = loader.decode(b"anything", Some("png")).unwrap();
        assert_eq!(img.size(), (1, 1));
    }
}
