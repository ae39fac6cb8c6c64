/// Pixel rectangle inside the source image (top-left origin, +Y down).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Exclusive right edge.
    #[inline]
    pub fn right(self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(self) -> u32 {
        self.y + self.height
    }

    #[inline]
    pub fn area(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Normalized texture rectangle.
///
/// `(u0, v0)` samples the tile's top-left corner and `(u1, v1)` its
/// bottom-right corner. With [`VAxis::BottomUp`](crate::VAxis) `v0 > v1`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    #[inline]
    pub const fn new(u0: f32, v0: f32, u1: f32, v1: f32) -> Self {
        Self { u0, v0, u1, v1 }
    }

    /// The rectangle covering the whole texture, top-down.
    pub const FULL: UvRect = UvRect::new(0.0, 0.0, 1.0, 1.0);

    #[inline]
    pub fn width(self) -> f32 {
        (self.u1 - self.u0).abs()
    }

    #[inline]
    pub fn height(self) -> f32 {
        (self.v1 - self.v0).abs()
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.u0, self.v0, self.u1, self.v1]
    }
}

/// Placement of a unit quad `[0, 1]²` inside the image rectangle `[-1, 1]²`.
///
/// Model space is +Y up with image row 0 at `y = +1`. The quad corner
/// `(0, 1)` lands on the tile's top-left.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ModelRect {
    pub translate: [f32; 2],
    pub scale: [f32; 2],
}

impl ModelRect {
    /// Maps a unit-quad point into model space.
    #[inline]
    pub fn apply(self, p: [f32; 2]) -> [f32; 2] {
        [
            self.translate[0] + p[0] * self.scale[0],
            self.translate[1] + p[1] * self.scale[1],
        ]
    }

    /// Column-major 4×4 matrix equal to `translate · scale`.
    pub fn to_cols_array(self) -> [f32; 16] {
        let [tx, ty] = self.translate;
        let [sx, sy] = self.scale;
        [
            sx, 0.0, 0.0, 0.0, //
            0.0, sy, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            tx, ty, 0.0, 1.0,
        ]
    }
}

/// One cell of a [`TileGrid`](crate::TileGrid).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tile {
    pub col: u32,
    pub row: u32,
    pub pixels: PixelRect,
    pub uv: UvRect,
    pub model: ModelRect,
}

impl Tile {
    #[inline]
    pub fn pixel_offset(&self) -> (u32, u32) {
        (self.pixels.x, self.pixels.y)
    }

    #[inline]
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.pixels.width, self.pixels.height)
    }
}
