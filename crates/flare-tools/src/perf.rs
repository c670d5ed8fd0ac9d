//! Frame cost tracking for emitter hosts.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::inspector::PoolSummary;

/// Rolling performance statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerfStats {
    /// Frames per second the measured cost would allow
    pub fps: f64,
    /// Average frame cost in milliseconds
    pub frame_time_ms: f64,
    /// Worst frame cost in the window, in milliseconds
    pub worst_frame_time_ms: f64,
    /// Live instances at sampling time
    pub live_instances: usize,
    /// Pool capacity
    pub capacity: u32,
    /// Particles emitted since start
    pub emitted_total: u64,
}

/// Tracks the cost of update and evaluation over a sliding window.
#[derive(Debug)]
pub struct PerfTracker {
    /// Frame cost history
    frame_times: VecDeque<Duration>,
    /// Per-frame budget
    budget: Duration,
    /// Window length
    history_length: usize,
    /// Total frames recorded
    frame_count: u64,
}

impl PerfTracker {
    /// Creates a tracker whose budget is one frame at `target_fps`.
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        Self::with_window(target_fps, 120)
    }

    /// Creates a tracker keeping the last `history_length` frames.
    #[must_use]
    pub fn with_window(target_fps: u32, history_length: usize) -> Self {
        let history_length = history_length.max(1);
        Self {
            frame_times: VecDeque::with_capacity(history_length),
            budget: Duration::from_secs_f64(1.0 / f64::from(target_fps.max(1))),
            history_length,
            frame_count: 0,
        }
    }

    /// Records one frame's cost.
    pub fn record(&mut self, cost: Duration) {
        if self.frame_times.len() >= self.history_length {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(cost);
        self.frame_count += 1;
    }

    /// Runs `frame`, recording how long it took.
    pub fn measure<T>(&mut self, frame: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = frame();
        self.record(start.elapsed());
        out
    }

    /// Average frame cost in milliseconds.
    #[must_use]
    pub fn average_frame_time_ms(&self) -> f64 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        let total: Duration = self.frame_times.iter().sum();
        total.as_secs_f64() * 1000.0 / self.frame_times.len() as f64
    }

    /// Frames per second the average cost allows.
    #[must_use]
    pub fn average_fps(&self) -> f64 {
        let ms = self.average_frame_time_ms();
        if ms > 0.0 {
            1000.0 / ms
        } else {
            0.0
        }
    }

    /// Worst frame cost in milliseconds.
    #[must_use]
    pub fn worst_frame_time_ms(&self) -> f64 {
        self.frame_times
            .iter()
            .max()
            .map_or(0.0, |d| d.as_secs_f64() * 1000.0)
    }

    /// Whether the average cost fits in the frame budget.
    #[must_use]
    pub fn is_within_budget(&self) -> bool {
        self.average_frame_time_ms() <= self.budget.as_secs_f64() * 1000.0
    }

    /// Total frames recorded.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Snapshot combining timing with pool occupancy.
    #[must_use]
    pub fn stats(&self, pool: &PoolSummary, emitted_total: u64) -> PerfStats {
        PerfStats {
            fps: self.average_fps(),
            frame_time_ms: self.average_frame_time_ms(),
            worst_frame_time_ms: self.worst_frame_time_ms(),
            live_instances: pool.live,
            capacity: pool.capacity,
            emitted_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_averages() {
        let mut tracker = PerfTracker::new(60);
        tracker.record(Duration::from_millis(2));
        tracker.record(Duration::from_millis(4));

        assert!((tracker.average_frame_time_ms() - 3.0).abs() < 1e-9);
        assert!((tracker.average_fps() - 1000.0 / 3.0).abs() < 1e-6);
        assert!((tracker.worst_frame_time_ms() - 4.0).abs() < 1e-9);
        assert!(tracker.is_within_budget());
        assert_eq!(tracker.frame_count(), 2);
    }

    #[test]
    fn test_window_slides() {
        let mut tracker = PerfTracker::with_window(60, 2);
        tracker.record(Duration::from_millis(100));
        tracker.record(Duration::from_millis(1));
        tracker.record(Duration::from_millis(1));

        assert!((tracker.worst_frame_time_ms() - 1.0).abs() < 1e-9);
        assert_eq!(tracker.frame_count(), 3);
    }

    #[test]
    fn test_over_budget() {
        let mut tracker = PerfTracker::new(100);
        tracker.record(Duration::from_millis(25));
        assert!(!tracker.is_within_budget());
    }

    #[test]
    fn test_empty_tracker() {
        let tracker = PerfTracker::new(60);
        assert_eq!(tracker.average_fps(), 0.0);
        assert_eq!(tracker.worst_frame_time_ms(), 0.0);
    }

    #[test]
    fn test_measure_and_stats() {
        let mut tracker = PerfTracker::new(60);
        let value = tracker.measure(|| 21 * 2);
        assert_eq!(value, 42);

        let summary = PoolSummary {
            capacity: 10,
            live: 4,
            ..PoolSummary::default()
        };
        let stats = tracker.stats(&summary, 17);
        assert_eq!(stats.live_instances, 4);
        assert_eq!(stats.capacity, 10);
        assert_eq!(stats.emitted_total, 17);
        assert_eq!(tracker.frame_count(), 1);
    }
}
