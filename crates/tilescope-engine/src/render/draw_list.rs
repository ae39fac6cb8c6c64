use glam::Mat4;
use tilescope_layout::{Tile, TileGrid, UvRect};

/// Identifies the texture a quad samples.
///
/// Handles are issued by [`TileRenderer::upload`](super::TileRenderer::upload);
/// uploading a new image invalidates older handles.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureHandle(pub(crate) u64);

/// One textured quad: the unit quad `[0, 1]²` placed by `model`, sampling
/// `uv` from `texture`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QuadCmd {
    pub model: Mat4,
    pub uv: UvRect,
    pub texture: TextureHandle,
}

impl QuadCmd {
    pub fn from_tile(tile: &Tile, texture: TextureHandle) -> Self {
        Self {
            model: Mat4::from_cols_array(&tile.model.to_cols_array()),
            uv: tile.uv,
            texture,
        }
    }
}

/// Draw stream for one frame, in submission order.
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<QuadCmd>,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears recorded quads; keeps capacity for the next frame.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[inline]
    pub fn push(&mut self, cmd: QuadCmd) {
        self.items.push(cmd);
    }

    /// Pushes one quad per tile of `grid`, in row-major order.
    pub fn push_grid(&mut self, grid: &TileGrid, texture: TextureHandle) {
        self.items.reserve(grid.tile_count());
        self.items.extend(grid.tiles().map(|t| QuadCmd::from_tile(&t, texture)));
    }

    #[inline]
    pub fn items(&self) -> &[QuadCmd] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use tilescope_layout::compute_grid;

    use super::*;

    #[test]
    fn grid_becomes_one_quad_per_tile() {
        let grid = compute_grid(600, 400, 256, 256).unwrap();
        let mut list = DrawList::new();
        list.push_grid(&grid, TextureHandle(1));
        assert_eq!(list.len(), 6);
        assert!(list.items().iter().all(|q| q.texture == TextureHandle(1)));

        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn quad_model_matches_tile_placement() {
        let grid = compute_grid(600, 400, 256, 256).unwrap();
        let tile = grid.tile_at(2, 1).unwrap();
        let quad = QuadCmd::from_tile(&tile, TextureHandle(0));

        let top_left = quad.model.transform_point3(Vec3::new(0.0, 1.0, 0.0));
        let [x, y] = tile.model.apply([0.0, 1.0]);
        assert!((top_left.x - x).abs() < 1e-6);
        assert!((top_left.y - y).abs() < 1e-6);

        let bottom_right = quad.model.transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!((bottom_right.x - 1.0).abs() < 1e-6);
        assert!((bottom_right.y + 1.0).abs() < 1e-6);
    }
}
