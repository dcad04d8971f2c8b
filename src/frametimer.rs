use std::time::{Duration, Instant};

use crate::peripherals::Clock;

/// Measures the time between frames and keeps an eye on the frame rate.
pub struct FrameTimer {
    pause: Duration,
    last_frame: Instant,
    last_fps_print: Instant,
    frames: u32,
}

impl FrameTimer {
    pub fn new<C: Clock>(clock: &C, pause: Duration) -> FrameTimer {
        let now = clock.now();

        FrameTimer {
            pause,
            last_frame: now,
            last_fps_print: now,
            frames: 0,
        }
    }

    /// Starts a frame and returns it together with the milliseconds since the
    /// previous one.
    pub fn next_frame<C: Clock>(&mut self, clock: &C) -> (Instant, f32) {
        let now = clock.now();
        let delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.update_fps(now);

        (now, delta.as_micros() as f32 / 1000.0)
    }

    /// Yields the CPU between frames. Animation timing does not depend on it.
    pub fn pause<C: Clock>(&self, clock: &C) {
        if !self.pause.is_zero() {
            clock.sleep(self.pause);
        }
    }

    fn update_fps(&mut self, now: Instant) {
        self.frames += 1;

        if now.saturating_duration_since(self.last_fps_print) > Duration::from_secs(1) {
            log::debug!("FPS: {}", self.frames);
            self.frames = 0;
            self.last_fps_print = now;
        }
    }
}
