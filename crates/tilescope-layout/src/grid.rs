use std::iter::FusedIterator;

use crate::error::{Dimension, LayoutError};
use crate::size::{TileSize, VAxis};
use crate::tile::{ModelRect, PixelRect, Tile, UvRect};

/// Partition of an image into a grid of tiles.
///
/// `columns = ceil(width / tile_width)`, `rows = ceil(height / tile_height)`.
/// Tiles are computed on demand from these numbers; the grid itself is a few
/// integers and is `Copy`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TileGrid {
    image_width: u32,
    image_height: u32,
    tile_size: TileSize,
    columns: u32,
    rows: u32,
    v_axis: VAxis,
}

/// Computes the grid for a `width × height` image cut into
/// `tile_width × tile_height` tiles, with a top-down V axis.
pub fn compute_grid(
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
) -> Result<TileGrid, LayoutError> {
    TileGrid::new(width, height, TileSize::new(tile_width, tile_height))
}

impl TileGrid {
    pub fn new(width: u32, height: u32, tile_size: TileSize) -> Result<Self, LayoutError> {
        let inputs = [
            (Dimension::Width, width),
            (Dimension::Height, height),
            (Dimension::TileWidth, tile_size.width),
            (Dimension::TileHeight, tile_size.height),
        ];
        if let Some(&(dim, _)) = inputs.iter().find(|(_, v)| *v == 0) {
            return Err(LayoutError::InvalidDimension(dim));
        }

        Ok(Self {
            image_width: width,
            image_height: height,
            tile_size,
            columns: width.div_ceil(tile_size.width),
            rows: height.div_ceil(tile_size.height),
            v_axis: VAxis::default(),
        })
    }

    /// Returns the same grid with texture coordinates in `v_axis` orientation.
    #[inline]
    pub fn with_v_axis(mut self, v_axis: VAxis) -> Self {
        self.v_axis = v_axis;
        self
    }

    /// Recomputes the grid for a new tile size, keeping image size and V axis.
    pub fn with_tile_size(self, tile_size: TileSize) -> Result<Self, LayoutError> {
        Ok(Self::new(self.image_width, self.image_height, tile_size)?.with_v_axis(self.v_axis))
    }

    #[inline]
    pub fn image_size(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    #[inline]
    pub fn tile_size(&self) -> TileSize {
        self.tile_size
    }

    #[inline]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub fn v_axis(&self) -> VAxis {
        self.v_axis
    }

    /// Total number of tiles (`columns * rows`).
    #[inline]
    pub fn tile_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Pixel width of the tiles in column `col`, or `None` past the last column.
    pub fn column_width(&self, col: u32) -> Option<u32> {
        (col < self.columns).then(|| span(col, self.tile_size.width, self.image_width))
    }

    /// Pixel height of the tiles in row `row`, or `None` past the last row.
    pub fn row_height(&self, row: u32) -> Option<u32> {
        (row < self.rows).then(|| span(row, self.tile_size.height, self.image_height))
    }

    /// Size of the bottom-right tile. Equals the nominal tile size when the
    /// image is an exact multiple of it.
    pub fn last_tile_size(&self) -> (u32, u32) {
        (
            span(self.columns - 1, self.tile_size.width, self.image_width),
            span(self.rows - 1, self.tile_size.height, self.image_height),
        )
    }

    pub fn tile_at(&self, col: u32, row: u32) -> Result<Tile, LayoutError> {
        if col >= self.columns || row >= self.rows {
            return Err(LayoutError::IndexOutOfRange {
                col,
                row,
                columns: self.columns,
                rows: self.rows,
            });
        }
        Ok(self.tile_unchecked(col, row))
    }

    /// Iterates all tiles in row-major order (row 0 left to right, then row 1, ...).
    ///
    /// The iterator copies the grid, so it can be created any number of times.
    #[inline]
    pub fn tiles(&self) -> Tiles {
        Tiles {
            grid: *self,
            next: 0,
            end: self.tile_count(),
        }
    }

    fn tile_unchecked(&self, col: u32, row: u32) -> Tile {
        let x = col * self.tile_size.width;
        let y = row * self.tile_size.height;
        let pixels = PixelRect {
            x,
            y,
            width: span(col, self.tile_size.width, self.image_width),
            height: span(row, self.tile_size.height, self.image_height),
        };

        let iw = self.image_width as f64;
        let ih = self.image_height as f64;

        let left = x as f64 / iw;
        let right = pixels.right() as f64 / iw;
        let top = y as f64 / ih;
        let bottom = pixels.bottom() as f64 / ih;

        let uv = UvRect::new(
            left as f32,
            self.v_axis.map(top as f32),
            right as f32,
            self.v_axis.map(bottom as f32),
        );

        let model = ModelRect {
            translate: [(2.0 * left - 1.0) as f32, (1.0 - 2.0 * bottom) as f32],
            scale: [
                (2.0 * pixels.width as f64 / iw) as f32,
                (2.0 * pixels.height as f64 / ih) as f32,
            ],
        };

        Tile { col, row, pixels, uv, model }
    }
}

impl<'a> IntoIterator for &'a TileGrid {
    type Item = Tile;
    type IntoIter = Tiles;

    fn into_iter(self) -> Tiles {
        self.tiles()
    }
}

/// Pixel extent of cell `index` along one axis.
///
/// `index * tile <= extent - 1` for every valid index, so the subtraction
/// never underflows and the result is never zero.
#[inline]
fn span(index: u32, tile: u32, extent: u32) -> u32 {
    tile.min(extent - index * tile)
}

/// Row-major tile iterator returned by [`TileGrid::tiles`].
#[derive(Debug, Clone)]
pub struct Tiles {
    grid: TileGrid,
    next: usize,
    end: usize,
}

impl Iterator for Tiles {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        if self.next >= self.end {
            return None;
        }
        let columns = self.grid.columns as usize;
        let col = (self.next % columns) as u32;
        let row = (self.next / columns) as u32;
        self.next += 1;
        Some(self.grid.tile_unchecked(col, row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.next;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Tiles {}

impl FusedIterator for Tiles {}
