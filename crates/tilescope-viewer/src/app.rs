use anyhow::{Context, Result};
use glam::Vec2;
use tilescope_engine::camera::{Camera2D, CameraConfig};
use tilescope_engine::core::{App, AppControl, FrameCtx};
use tilescope_engine::input::{InputFrame, Key};
use tilescope_engine::loader::Image;
use tilescope_engine::render::{fit_scale, DrawList, TextureHandle, TileRenderer};
use tilescope_layout::{TileGrid, TileSize};

use crate::config::{ViewerConfig, TILE_SIDE_RANGE};

/// Frames between fps reports at `debug` level.
const FPS_LOG_INTERVAL: u64 = 600;

/// The viewer session: one image, one grid, one camera.
///
/// The image is decoded before the window exists and uploaded on the first
/// frame. A failed upload ends the session; the error is kept for `main`.
pub struct ViewerApp {
    grid: TileGrid,
    tile_size: TileSize,
    single_quad: bool,
    title: String,

    camera: Camera2D,
    renderer: TileRenderer,
    draw_list: DrawList,

    pending: Option<Image>,
    texture: Option<TextureHandle>,
    failure: Option<anyhow::Error>,
}

impl ViewerApp {
    pub fn new(image: Image, config: &ViewerConfig) -> Result<Self> {
        let (width, height) = image.size();
        let grid = TileGrid::new(width, height, config.tile_size)
            .context("invalid tile layout")?
            .with_v_axis(config.render.v_axis);

        let mut app = Self {
            grid,
            tile_size: config.tile_size,
            single_quad: false,
            title: config.runtime.title.clone(),
            camera: Camera2D::new(CameraConfig::default()),
            renderer: TileRenderer::new(config.render.clone()),
            draw_list: DrawList::new(),
            pending: Some(image),
            texture: None,
            failure: None,
        };
        if config.single_quad {
            app.set_single_quad(true)?;
        } else {
            log_grid(&app.grid);
        }
        Ok(app)
    }

    #[inline]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// The error that ended the session, if any.
    pub fn take_failure(&mut self) -> Option<anyhow::Error> {
        self.failure.take()
    }

    /// Halves (`grow == false`) or doubles the nominal tile size.
    pub fn resize_tiles(&mut self, grow: bool) -> Result<()> {
        let (lo, hi) = TILE_SIDE_RANGE;
        let step = |side: u32| {
            let next = if grow { side.saturating_mul(2) } else { side / 2 };
            next.clamp(lo, hi)
        };
        let next = TileSize::new(step(self.tile_size.width), step(self.tile_size.height));
        if next == self.tile_size {
            return Ok(());
        }

        self.tile_size = next;
        if !self.single_quad {
            self.rebuild_grid()?;
        }
        Ok(())
    }

    pub fn set_single_quad(&mut self, single_quad: bool) -> Result<()> {
        self.single_quad = single_quad;
        self.rebuild_grid()
    }

    fn rebuild_grid(&mut self) -> Result<()> {
        let (width, height) = self.grid.image_size();
        let size = if self.single_quad {
            TileSize::whole(width, height)
        } else {
            self.tile_size
        };
        self.grid = self
            .grid
            .with_tile_size(size)
            .context("failed to recompute tile grid")?;
        log_grid(&self.grid);
        Ok(())
    }

    /// Layout keys. Returns true when the grid changed.
    fn handle_layout_keys(&mut self, frame: &InputFrame) -> Result<bool> {
        let before = self.grid;
        if frame.pressed(Key::BracketLeft) {
            self.resize_tiles(false)?;
        }
        if frame.pressed(Key::BracketRight) {
            self.resize_tiles(true)?;
        }
        if frame.pressed(Key::T) {
            self.set_single_quad(!self.single_quad)?;
        }
        Ok(self.grid != before)
    }

    fn window_title(&self) -> String {
        let TileSize { width, height } = self.grid.tile_size();
        format!(
            "{} [{}x{} tiles of {width}x{height}]",
            self.title,
            self.grid.columns(),
            self.grid.rows()
        )
    }

    fn fail(&mut self, err: anyhow::Error) -> AppControl {
        self.failure = Some(err);
        AppControl::Exit
    }

    /// Folds the render outcome and any upload error into the frame result.
    fn finish_frame(
        &mut self,
        rendered: Result<AppControl>,
        upload_error: Option<anyhow::Error>,
    ) -> AppControl {
        if let Some(err) = upload_error {
            return self.fail(err);
        }
        match rendered {
            Ok(control) => control,
            Err(err) => self.fail(err.context("GPU failure")),
        }
    }
}

impl App for ViewerApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input_frame.pressed(Key::Escape) {
            return AppControl::Exit;
        }

        match self.handle_layout_keys(ctx.input_frame) {
            Ok(true) => ctx.runtime.set_title(self.window_title()),
            Ok(false) => {}
            Err(err) => return self.fail(err),
        }

        let viewport = ctx.window.viewport();
        let fit = fit_scale(
            self.grid.image_size(),
            viewport,
            self.renderer.config().preserve_aspect,
        );
        self.camera.update(
            ctx.input,
            ctx.input_frame,
            ctx.time.dt,
            Vec2::new(viewport.width, viewport.height),
            fit,
        );
        let camera = self.camera.transform();

        if ctx.time.frame_index % FPS_LOG_INTERVAL == FPS_LOG_INTERVAL - 1 {
            log::debug!("frame {}: {:.1} fps", ctx.time.frame_index + 1, ctx.time.fps);
        }

        let clear = self.renderer.config().clear_color;
        let mut upload_error = None;

        let rendered = ctx.render(clear, |rctx, target| {
            if let Some(image) = self.pending.take() {
                match self.renderer.upload(rctx, &image) {
                    Ok(handle) => self.texture = Some(handle),
                    Err(err) => {
                        upload_error = Some(err);
                        return;
                    }
                }
            }

            let Some(handle) = self.texture else { return };
            self.draw_list.clear();
            self.draw_list.push_grid(&self.grid, handle);
            self.renderer.render(rctx, target, &self.draw_list, camera);
        });

        self.finish_frame(rendered, upload_error)
    }
}

/// Logs the layout summary for the current grid.
fn log_grid(grid: &TileGrid) {
    let (width, height) = grid.image_size();
    let tile = grid.tile_size();
    let (last_width, last_height) = grid.last_tile_size();
    log::info!("image size: {width} x {height}");
    log::info!("number of tiles (X x Y): {} x {}", grid.columns(), grid.rows());
    log::info!("tile size: {} x {}", tile.width, tile.height);
    log::info!("last column tile size: {last_width} x {}", tile.height.min(height));
    log::info!("last row tile size: {} x {last_height}", tile.width.min(width));
}
