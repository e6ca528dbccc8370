//! Frame counter reporting frames per second once per interval.

use std::time::{Duration, Instant};

pub struct FrameCounter {
    interval: Duration,
    window_start: Instant,
    frames: u32,
}

impl FrameCounter {
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    pub fn starting_at(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            window_start: now,
            frames: 0,
        }
    }

    /// Count one frame; returns the average FPS when an interval has elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.interval {
            return None;
        }
        let fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.window_start = now;
        Some(fps)
    }
}
