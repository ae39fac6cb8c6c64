use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,

    /// Smoothed frames per second.
    pub fps: f32,
}

/// Produces `FrameTime` snapshots.
///
/// Delta time is clamped so a stall (debugger, minimized window) does not turn
/// into one huge camera jump on the next frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
    fps: f32,
}

impl FrameClock {
    /// Smoothing factor of the fps moving average.
    const FPS_ALPHA: f32 = 0.1;

    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
            fps: 0.0,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = self.advance(now.saturating_duration_since(self.last));
        self.last = now;

        FrameTime {
            dt,
            now,
            frame_index: self.frame_index.wrapping_sub(1),
            fps: self.fps,
        }
    }

    fn advance(&mut self, elapsed: Duration) -> f32 {
        let dt = elapsed.clamp(self.dt_min, self.dt_max).as_secs_f32();

        let instant_fps = 1.0 / dt;
        self.fps = if self.frame_index == 0 {
            instant_fps
        } else {
            self.fps + (instant_fps - self.fps) * Self::FPS_ALPHA
        };

        self.frame_index = self.frame_index.wrapping_add(1);
        dt
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dt_is_clamped() {
        let mut clock = FrameClock::new();
        assert!((clock.advance(Duration::ZERO) - 0.0001).abs() < 1e-7);
        assert_eq!(clock.advance(Duration::from_secs(5)), 0.25);
    }

    #[test]
    fn fps_converges_to_steady_rate() {
        let mut clock = FrameClock::new();
        for _ in 0..200 {
            clock.advance(Duration::from_micros(16_667));
        }
        assert!((clock.fps - 60.0).abs() < 0.5, "fps = {}", clock.fps);
    }

    #[test]
    fn frame_index_counts_ticks() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick().frame_index, 0);
        assert_eq!(clock.tick().frame_index, 1);
    }
}
