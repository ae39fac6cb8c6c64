//! tilescope engine crate.
//!
//! Owns the platform + GPU runtime used by the viewer: one window, one wgpu
//! surface, keyboard/mouse input, a 2D camera, the image loader and the
//! tiled texture renderer.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod camera;
pub mod loader;
pub mod render;
