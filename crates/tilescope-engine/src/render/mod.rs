//! GPU rendering.
//!
//! The image is uploaded once as a single texture ([`ImageTexture`]). Each
//! frame the app fills a [`DrawList`] with one [`QuadCmd`] per tile and the
//! [`TileRenderer`] issues one draw call per quad.
//!
//! Conventions:
//! - model space is the image rectangle `[-1, 1]²`, +Y up, image top at `y = +1`
//! - texture coordinates follow the grid's `VAxis`; the default `TopDown`
//!   is wgpu's native orientation (`v = 0` is image row 0)
//! - `view = fit · camera`, where `fit` keeps the image aspect ratio

mod config;
mod ctx;
mod draw_list;
mod texture;
mod tiles;

pub use config::{RenderConfig, TextureFilter};
pub use ctx::{RenderCtx, RenderTarget, Viewport};
pub use draw_list::{DrawList, QuadCmd, TextureHandle};
pub use texture::{mip_chain_len, ImageTexture};
pub use tiles::{fit_matrix, fit_scale, TileRenderer};
