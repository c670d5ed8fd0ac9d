//! Frame timing.
//!
//! Turns wall-clock frame deltas into a whole number of fixed simulation
//! steps, and paces the loop when running in real time.

use std::time::{Duration, Instant};

/// Upper bound on steps taken in one frame.
const MAX_STEPS_PER_FRAME: u32 = 10;

/// Fixed-step frame clock.
#[derive(Debug)]
pub struct FrameTiming {
    /// Time budget per frame
    frame_budget: Duration,
    /// Time of last frame start
    last_frame: Instant,
    /// Unconsumed time
    accumulator: f32,
    /// Fixed simulation step
    fixed_dt: f32,
    /// Maximum delta accepted from one frame
    max_dt: f32,
}

impl FrameTiming {
    /// Create a frame clock stepping at `frame_rate` Hz.
    #[must_use]
    pub fn new(frame_rate: u32) -> Self {
        let frame_rate = frame_rate.max(1);
        Self {
            frame_budget: Duration::from_secs_f64(1.0 / f64::from(frame_rate)),
            last_frame: Instant::now(),
            accumulator: 0.0,
            fixed_dt: 1.0 / frame_rate as f32,
            max_dt: 0.25,
        }
    }

    /// Fixed simulation step in seconds.
    #[must_use]
    pub const fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Wall time since the previous call, clamped to the maximum delta.
    pub fn delta_time(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        dt.min(self.max_dt)
    }

    /// Accumulate `dt` and return how many fixed steps are due.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        self.accumulator += dt;
        let mut count = 0;

        while self.accumulator >= self.fixed_dt && count < MAX_STEPS_PER_FRAME {
            self.accumulator -= self.fixed_dt;
            count += 1;
        }

        // Still behind: drop the backlog
        if self.accumulator > self.fixed_dt * 2.0 {
            self.accumulator = 0.0;
        }

        count
    }

    /// Sleep for what is left of the frame budget.
    pub fn sleep_remainder(&self) {
        let elapsed = self.last_frame.elapsed();
        if elapsed < self.frame_budget {
            std::thread::sleep(self.frame_budget - elapsed);
        }
    }

    /// Reset timing (call after loading).
    pub fn reset(&mut self) {
        self.last_frame = Instant::now();
        self.accumulator = 0.0;
    }
}
