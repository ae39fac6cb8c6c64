//! Tile layout for rendering an image as a grid of textured quads.
//!
//! An image of arbitrary pixel size is split into fixed-size tiles
//! (256×256 by default). Tiles on the right and bottom edges shrink to the
//! remainder so the grid covers the image exactly once. For every tile the
//! grid yields:
//!
//! - the pixel rectangle inside the source image
//! - the normalized texture rectangle used to sample the single texture
//! - the model rectangle placing a unit quad inside `[-1, 1]²`
//!
//! ```
//! use tilescope_layout::compute_grid;
//!
//! let grid = compute_grid(600, 400, 256, 256).unwrap();
//! assert_eq!((grid.columns(), grid.rows()), (3, 2));
//!
//! let corner = grid.tile_at(2, 1).unwrap();
//! assert_eq!(corner.pixel_size(), (88, 144));
//! ```
//!
//! The grid is plain data. It holds no GPU or file resources and can be
//! recomputed or copied freely.

pub mod error;
pub mod grid;
pub mod size;
pub mod tile;

pub use error::{Dimension, LayoutError};
pub use grid::{compute_grid, TileGrid, Tiles};
pub use size::{TileSize, VAxis};
pub use tile::{ModelRect, PixelRect, Tile, UvRect};
