use anyhow::{bail, Result};
use winit::window::Window;

use crate::device::{Gpu, SurfaceErrorAction};
use crate::input::{InputFrame, InputState};
use crate::render::{RenderCtx, RenderTarget, Viewport};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// The window being drawn.
pub struct WindowCtx<'a> {
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Logical window size as `(width, height)`.
    pub fn logical_size(&self) -> (f32, f32) {
        let phys = self.window.inner_size();
        let scale = self.window.scale_factor();
        let logi: winit::dpi::LogicalSize<f64> = phys.to_logical(scale);
        (logi.width as f32, logi.height as f32)
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        let (w, h) = self.logical_size();
        Viewport::new(w, h)
    }
}

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Clears the surface with `clear`, calls `draw` with a ready
    /// [`RenderCtx`] and [`RenderTarget`], then presents the frame.
    ///
    /// Surface loss is handled here and the frame is skipped. An error is
    /// returned only when the surface cannot be recovered.
    pub fn render<F>(&mut self, clear: wgpu::Color, draw: F) -> Result<AppControl>
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let viewport = self.window.viewport();

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => return skipped_frame(self.gpu.handle_surface_error(err)),
        };

        // Dropped before the encoder is moved into submit().
        {
            let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tilescope clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        let rctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            viewport,
        );

        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            draw(&rctx, &mut target);
        }

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        Ok(AppControl::Continue)
    }
}

/// Outcome of a frame whose surface texture could not be acquired.
fn skipped_frame(action: SurfaceErrorAction) -> Result<AppControl> {
    match action {
        SurfaceErrorAction::Fatal => bail!("surface out of memory; rendering cannot continue"),
        SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => Ok(AppControl::Continue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_surface_errors_skip_the_frame() {
        for action in [SurfaceErrorAction::Reconfigured, SurfaceErrorAction::SkipFrame] {
            assert_eq!(skipped_frame(action).unwrap(), AppControl::Continue);
        }
    }

    #[test]
    fn fatal_surface_error_is_an_error() {
        let err = skipped_frame(SurfaceErrorAction::Fatal).unwrap_err();
        assert!(err.to_string().contains("out of memory"));
    }
}
