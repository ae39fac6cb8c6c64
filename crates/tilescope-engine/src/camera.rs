//! 2D pan/zoom camera driven by keyboard and mouse.
//!
//! Bindings: W/S and Up/Down pan vertically, A/D and Left/Right pan
//! horizontally, Q and `=` zoom in, E and `-` zoom out, the wheel zooms,
//! dragging with the primary button pans, R or Home resets.

use glam::{Mat4, Vec2, Vec3};

use crate::input::{InputFrame, InputState, Key, MouseButton};

/// Camera tuning.
///
/// Motion is time-based. The defaults equal a step of 0.01 units, a zoom-in
/// factor of 1.01 and a zoom-out factor of 0.99 per frame at 60 Hz.
#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// Pan speed in model units per second.
    pub pan_speed: f32,
    /// Zoom factor applied per second while a zoom-in key is held.
    pub zoom_rate: f32,
    /// Zoom factor applied per second while a zoom-out key is held (< 1).
    pub zoom_out_rate: f32,
    /// Zoom factor per wheel line.
    pub wheel_zoom_step: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Button that pans by dragging; `None` disables drag panning.
    pub drag_button: Option<MouseButton>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            pan_speed: 0.6,
            zoom_rate: 1.01f32.powi(60),
            zoom_out_rate: 0.99f32.powi(60),
            wheel_zoom_step: 1.1,
            min_scale: 0.01,
            max_scale: 256.0,
            drag_button: Some(MouseButton::Left),
        }
    }
}

/// Pan offset + uniform scale.
///
/// [`transform`](Self::transform) is `scale · translate`: a model point `p`
/// ends up at `scale * (p + offset)`. The same matrix is applied to every
/// tile of a frame.
#[derive(Debug, Clone)]
pub struct Camera2D {
    offset: Vec2,
    scale: f32,
    config: CameraConfig,
}

impl Camera2D {
    pub fn new(config: CameraConfig) -> Self {
        Self { offset: Vec2::ZERO, scale: 1.0, config }
    }

    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.scale = 1.0;
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Multiplies the scale by `factor`, clamped to the configured range.
    pub fn zoom_by(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.scale = (self.scale * factor).clamp(self.config.min_scale, self.config.max_scale);
    }

    /// Applies one frame of input.
    ///
    /// `viewport` is the window size in logical pixels and `fit` the per-axis
    /// scale applied after the camera (see `render::fit_scale`). Together
    /// they convert drag distances into model units so the image follows the
    /// pointer.
    pub fn update(
        &mut self,
        input: &InputState,
        frame: &InputFrame,
        dt: f32,
        viewport: Vec2,
        fit: Vec2,
    ) {
        if frame.pressed(Key::R) || frame.pressed(Key::Home) {
            self.reset();
            return;
        }

        let held = |a: Key, b: Key| input.key_down(a) || input.key_down(b);
        let step = self.config.pan_speed * dt;

        let mut pan = Vec2::ZERO;
        if held(Key::W, Key::ArrowUp) {
            pan.y += step;
        }
        if held(Key::S, Key::ArrowDown) {
            pan.y -= step;
        }
        if held(Key::A, Key::ArrowLeft) {
            pan.x -= step;
        }
        if held(Key::D, Key::ArrowRight) {
            pan.x += step;
        }

        if let Some(button) = self.config.drag_button {
            let (dx, dy) = frame.pointer_delta;
            let usable = viewport.cmpgt(Vec2::ZERO).all() && fit.cmpgt(Vec2::ZERO).all();
            if input.button_down(button) && usable {
                // Window space is +Y down, NDC is +Y up.
                let ndc = Vec2::new(2.0 * dx / viewport.x, -2.0 * dy / viewport.y);
                pan += ndc / (fit * self.scale);
            }
        }
        self.pan(pan);

        if held(Key::Q, Key::Equal) {
            self.zoom_by(self.config.zoom_rate.powf(dt));
        }
        if held(Key::E, Key::Minus) {
            self.zoom_by(self.config.zoom_out_rate.powf(dt));
        }
        if frame.wheel_lines != 0.0 {
            self.zoom_by(self.config.wheel_zoom_step.powf(frame.wheel_lines));
        }
    }

    /// The view matrix: scale, then translate.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale(Vec3::new(self.scale, self.scale, 1.0))
            * Mat4::from_translation(self.offset.extend(0.0))
    }
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputEvent, KeyState, Modifiers};

    const VIEWPORT: Vec2 = Vec2::new(800.0, 800.0);

    fn hold(keys: &[Key]) -> InputState {
        let mut state = InputState::default();
        state.keys_down.extend(keys.iter().copied());
        state
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn transform_scales_after_translating() {
        let mut cam = Camera2D::default();
        cam.pan(Vec2::new(0.5, -0.25));
        cam.zoom_by(2.0);
        let p = cam.transform().transform_point3(Vec3::new(0.1, 0.1, 0.0));
        assert!(close(p.x, 2.0 * (0.1 + 0.5)));
        assert!(close(p.y, 2.0 * (0.1 - 0.25)));
    }

    #[test]
    fn identity_by_default() {
        assert_eq!(Camera2D::default().transform(), Mat4::IDENTITY);
    }

    #[test]
    fn keys_pan_at_configured_speed() {
        let mut cam = Camera2D::default();
        let input = hold(&[Key::W, Key::D]);
        cam.update(&input, &InputFrame::default(), 0.5, VIEWPORT, Vec2::ONE);
        assert!(close(cam.offset().x, 0.3));
        assert!(close(cam.offset().y, 0.3));
    }

    #[test]
    fn one_sixtieth_second_matches_per_frame_step() {
        let mut cam = Camera2D::default();
        cam.update(&hold(&[Key::A, Key::Q]), &InputFrame::default(), 1.0 / 60.0, VIEWPORT, Vec2::ONE);
        assert!(close(cam.offset().x, -0.01));
        assert!(close(cam.scale(), 1.01));
    }

    #[test]
    fn one_sixtieth_second_of_zoom_out_matches_per_frame_step() {
        let mut cam = Camera2D::default();
        cam.update(&hold(&[Key::E]), &InputFrame::default(), 1.0 / 60.0, VIEWPORT, Vec2::ONE);
        assert!(close(cam.scale(), 0.99));
    }

    #[test]
    fn zoom_out_and_clamp() {
        let mut cam = Camera2D::default();
        cam.update(&hold(&[Key::E]), &InputFrame::default(), 0.25, VIEWPORT, Vec2::ONE);
        assert!(cam.scale() < 1.0);
        cam.zoom_by(1e-9);
        assert_eq!(cam.scale(), cam.config().min_scale);
        cam.zoom_by(0.0);
        assert_eq!(cam.scale(), cam.config().min_scale);
    }

    #[test]
    fn wheel_zooms_per_line() {
        let mut cam = Camera2D::default();
        let frame = InputFrame { wheel_lines: 2.0, ..Default::default() };
        cam.update(&InputState::default(), &frame, 0.016, VIEWPORT, Vec2::ONE);
        assert!(close(cam.scale(), 1.21));
    }

    #[test]
    fn drag_pans_in_model_units() {
        let mut cam = Camera2D::default();
        cam.zoom_by(2.0);
        let mut input = InputState::default();
        input.buttons_down.insert(MouseButton::Left);
        let frame = InputFrame { pointer_delta: (400.0, 200.0), ..Default::default() };
        cam.update(&input, &frame, 0.016, VIEWPORT, Vec2::ONE);
        assert!(close(cam.offset().x, 0.5));
        assert!(close(cam.offset().y, -0.25));
    }

    #[test]
    fn drag_follows_pointer_through_letterbox() {
        // 2000x500 image in an 800x600 window: fit y = 1/3.
        let mut cam = Camera2D::default();
        let mut input = InputState::default();
        input.buttons_down.insert(MouseButton::Left);
        let frame = InputFrame { pointer_delta: (0.0, -300.0), ..Default::default() };
        let fit = Vec2::new(1.0, 1.0 / 3.0);
        cam.update(&input, &frame, 0.016, Vec2::new(800.0, 600.0), fit);

        // 300 px up is 1.0 NDC; the image must move the same distance on screen.
        let on_screen = fit.y * cam.scale() * cam.offset().y;
        assert!(close(on_screen, 1.0));
    }

    #[test]
    fn reset_key_restores_identity() {
        let mut cam = Camera2D::default();
        cam.pan(Vec2::new(1.0, 1.0));
        cam.zoom_by(3.0);

        let mut input = InputState::default();
        let mut frame = InputFrame::default();
        input.apply_event(
            &mut frame,
            InputEvent::Key {
                key: Key::R,
                state: KeyState::Pressed,
                modifiers: Modifiers::default(),
                repeat: false,
            },
        );
        cam.update(&input, &frame, 0.016, VIEWPORT, Vec2::ONE);
        assert_eq!(cam.transform(), Mat4::IDENTITY);
    }
}
