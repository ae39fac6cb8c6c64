use image::RgbaImage;

/// Decoded image: tightly packed RGBA8, rows top to bottom.
///
/// Width and height are always non-zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    rgba: RgbaImage,
}

impl Image {
    /// Wraps an RGBA buffer; `None` if either dimension is zero.
    pub fn from_rgba8(rgba: RgbaImage) -> Option<Self> {
        (rgba.width() > 0 && rgba.height() > 0).then_some(Self { rgba })
    }

    /// Builds an image from raw RGBA8 bytes; `None` on a size mismatch or a
    /// zero dimension.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, pixels).and_then(Self::from_rgba8)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.rgba.dimensions()
    }

    /// Raw bytes, `width * height * 4` long.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        self.rgba.as_raw()
    }

    #[inline]
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.rgba
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_images_are_rejected() {
        assert!(Image::from_rgba8(RgbaImage::new(0, 4)).is_none());
        assert!(Image::from_raw(0, 0, Vec::new()).is_none());
    }

    #[test]
    fn raw_buffer_length_must_match() {
        assert!(Image::from_raw(2, 2, vec![0; 15]).is_none());
        let img = Image::from_raw(2, 2, vec![0; 16]).unwrap();
        assert_eq!(img.size(), (2, 2));
    }
}
