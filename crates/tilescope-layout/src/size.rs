/// Nominal tile size in pixels.
///
/// Interior tiles are exactly this size; boundary tiles may be smaller.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

impl TileSize {
    /// 256×256, the size the texture demos were tuned for.
    pub const DEFAULT: TileSize = TileSize::square(256);

    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub const fn square(side: u32) -> Self {
        Self { width: side, height: side }
    }

    /// A single tile spanning the whole image (one quad, no tiling).
    #[inline]
    pub const fn whole(image_width: u32, image_height: u32) -> Self {
        Self { width: image_width, height: image_height }
    }
}

impl Default for TileSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Orientation of the texture V axis.
///
/// Image row 0 is always the top of the picture. Back ends disagree on which
/// end of the V axis addresses it.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum VAxis {
    /// `v = 0` addresses image row 0 (wgpu, D3D, Metal).
    #[default]
    TopDown,
    /// `v = 1` addresses image row 0 (OpenGL with unflipped uploads).
    BottomUp,
}

impl VAxis {
    /// Maps a top-down normalized row coordinate into this orientation.
    #[inline]
    pub fn map(self, v: f32) -> f32 {
        match self {
            VAxis::TopDown => v,
            VAxis::BottomUp => 1.0 - v,
        }
    }
}
