//! Emission scheduling.
//!
//! The scheduler owns the emission clock and decides, each frame, how many
//! slots to (re)populate and where. In time mode the target emission count
//! grows linearly with the clock; in burst mode it is `rate` at once. The
//! difference to what has already been emitted is spawned at the cursor.
//!
//! State machine: `Stopped -> Running <-> Paused -> Stopped`.

use glam::Vec3;
use tracing::{debug, trace};

use crate::attributes::{populate, RandomSource};
use crate::config::{SimulationConfig, SpawnMode};
use crate::pool::InstancePool;

/// Emitter lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitterState {
    /// Not emitting; hidden
    #[default]
    Stopped,
    /// Emitting and aging
    Running,
    /// Frozen; clock does not advance
    Paused,
}

/// Spawn metadata for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnWindow {
    /// First slot index written this frame
    pub cursor: u32,
    /// Particles spawned this frame
    pub count: u32,
}

/// Emission clock and cursor.
#[derive(Debug, Clone, Default)]
pub struct EmissionScheduler {
    state: EmitterState,
    clock_time: f32,
    cursor: u32,
    emitted_total: u64,
    visible: bool,
    last_window: Option<SpawnWindow>,
}

impl EmissionScheduler {
    /// Creates a stopped scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the clock and counters, parks every slot and begins emitting.
    pub fn start(&mut self, pool: &mut InstancePool) {
        self.state = EmitterState::Running;
        self.clock_time = 0.0;
        self.cursor = 0;
        self.emitted_total = 0;
        self.visible = true;
        self.last_window = None;
        pool.clear_lifetimes();
        debug!("Emitter started ({} slots)", pool.capacity());
    }

    /// Freezes the clock. Only valid while running.
    pub fn pause(&mut self) {
        if self.state == EmitterState::Running {
            self.state = EmitterState::Paused;
            debug!("Emitter paused at t={:.3}", self.clock_time);
        }
    }

    /// Leaves the paused state without resetting anything.
    pub fn resume(&mut self) {
        if self.state == EmitterState::Paused {
            self.state = EmitterState::Running;
            debug!("Emitter resumed at t={:.3}", self.clock_time);
        }
    }

    /// Stops emitting and hides the emitter. Slot contents, the clock and
    /// the last spawn window are kept.
    pub fn stop(&mut self) {
        self.state = EmitterState::Stopped;
        self.visible = false;
        debug!("Emitter stopped");
    }

    /// Advances the clock by `delta`, spawning into `pool` as needed.
    ///
    /// Returns the spawn window when slots were (re)populated. Spawned slots
    /// record the clock time at the start of the frame; the emission target
    /// is taken at the end of it.
    pub fn update<R: RandomSource + ?Sized>(
        &mut self,
        delta: f32,
        config: &SimulationConfig,
        pool: &mut InstancePool,
        rng: &mut R,
        origin: Vec3,
    ) -> Option<SpawnWindow> {
        if self.state != EmitterState::Running {
            return None;
        }

        self.last_window = self.spawn(delta, config, pool, rng, origin);
        self.clock_time += delta;
        self.last_window
    }

    fn spawn<R: RandomSource + ?Sized>(
        &mut self,
        delta: f32,
        config: &SimulationConfig,
        pool: &mut InstancePool,
        rng: &mut R,
        origin: Vec3,
    ) -> Option<SpawnWindow> {
        let emitter = &config.emitter;
        let capacity = pool.capacity();
        if capacity == 0 {
            return None;
        }

        let rate = u64::from(emitter.rate);
        let amount = match emitter.spawn_mode {
            SpawnMode::Burst => rate,
            SpawnMode::Time => {
                let elapsed = self.clock_time + delta - emitter.delay;
                let target = (elapsed / emitter.duration * emitter.rate as f32).floor();
                if target.is_finite() && target > 0.0 {
                    target as u64
                } else {
                    0
                }
            }
        };
        let amount = if emitter.looping { amount } else { amount.min(rate) };
        let spawn_count = amount.saturating_sub(self.emitted_total);

        if self.emitted_total >= rate && !emitter.looping {
            return None;
        }

        if emitter.spawn_mode == SpawnMode::Time && self.cursor >= capacity {
            self.cursor = 0;
        }

        // Writes past one full lap would be overwritten within the frame.
        let capacity64 = u64::from(capacity);
        let writes = spawn_count.min(capacity64);
        for k in (spawn_count - writes)..spawn_count {
            let index = (u64::from(self.cursor) + k) % capacity64;
            let slot = populate(rng, config, origin, self.clock_time);
            pool.write_slot(index as usize, &slot);
        }
        pool.mark_all_dirty();

        let window = SpawnWindow {
            cursor: self.cursor,
            count: spawn_count.min(u64::from(u32::MAX)) as u32,
        };
        if spawn_count > 0 {
            trace!(
                "Spawned {} particles at cursor {} (t={:.3})",
                spawn_count,
                self.cursor,
                self.clock_time
            );
        }

        if emitter.spawn_mode == SpawnMode::Time {
            self.cursor = ((u64::from(self.cursor) + spawn_count) % capacity64) as u32;
        }
        self.emitted_total += spawn_count;

        Some(window)
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> EmitterState {
        self.state
    }

    /// Whether the emitter is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == EmitterState::Running
    }

    /// Emission clock in seconds since `start`.
    #[must_use]
    pub const fn clock_time(&self) -> f32 {
        self.clock_time
    }

    /// Next slot index to write.
    #[must_use]
    pub const fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Particles spawned since `start`.
    #[must_use]
    pub const fn emitted_total(&self) -> u64 {
        self.emitted_total
    }

    /// Whether the emitter should be drawn.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Spawn window of the most recent running frame.
    #[must_use]
    pub const fn last_window(&self) -> Option<SpawnWindow> {
        self.last_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::ScriptedSource;

    fn time_config(count: u32, rate: u32) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.particles.count = count;
        config.emitter.rate = rate;
        config.emitter.duration = 1.0;
        config
    }

    fn run(
        scheduler: &mut EmissionScheduler,
        config: &SimulationConfig,
        pool: &mut InstancePool,
        delta: f32,
    ) -> Option<SpawnWindow> {
        let mut rng = ScriptedSource::new([0.5]);
        scheduler.update(delta, config, pool, &mut rng, Vec3::ZERO)
    }

    #[test]
    fn test_state_transitions() {
        let mut pool = InstancePool::new(4);
        let mut scheduler = EmissionScheduler::new();
        assert_eq!(scheduler.state(), EmitterState::Stopped);

        scheduler.pause();
        assert_eq!(scheduler.state(), EmitterState::Stopped);

        scheduler.start(&mut pool);
        assert!(scheduler.is_running());
        assert!(scheduler.is_visible());

        scheduler.pause();
        assert_eq!(scheduler.state(), EmitterState::Paused);
        scheduler.resume();
        assert!(scheduler.is_running());

        scheduler.stop();
        assert_eq!(scheduler.state(), EmitterState::Stopped);
        assert!(!scheduler.is_visible());
        scheduler.resume();
        assert_eq!(scheduler.state(), EmitterState::Stopped);
    }

    #[test]
    fn test_time_mode_spreads_emission() {
        let config = time_config(10, 10);
        let mut pool = InstancePool::new(10);
        let mut scheduler = EmissionScheduler::new();
        scheduler.start(&mut pool);

        let window = run(&mut scheduler, &config, &mut pool, 0.5);
        assert_eq!(window, Some(SpawnWindow { cursor: 0, count: 5 }));
        assert_eq!(scheduler.emitted_total(), 5);
        assert_eq!(scheduler.cursor(), 5);

        let window = run(&mut scheduler, &config, &mut pool, 0.5);
        assert_eq!(window, Some(SpawnWindow { cursor: 5, count: 5 }));
        assert_eq!(scheduler.emitted_total(), 10);

        pool.take_dirty();
        assert_eq!(run(&mut scheduler, &config, &mut pool, 0.5), None);
        assert_eq!(scheduler.emitted_total(), 10);
        assert!(!pool.any_dirty());
        assert_eq!(scheduler.clock_time(), 1.5);
    }

    #[test]
    fn test_spawned_slots_record_frame_start() {
        let config = time_config(10, 10);
        let mut pool = InstancePool::new(10);
        let mut scheduler = EmissionScheduler::new();
        scheduler.start(&mut pool);

        run(&mut scheduler, &config, &mut pool, 0.5);
        run(&mut scheduler, &config, &mut pool, 0.5);

        let first = pool.slot(0).expect("slot in range");
        let second = pool.slot(7).expect("slot in range");
        assert_eq!(first.spawn_time, 0.0);
        assert_eq!(second.spawn_time, 0.5);
    }

    #[test]
    fn test_delay_postpones_emission() {
        let mut config = time_config(10, 10);
        config.emitter.delay = 1.0;
        let mut pool = InstancePool::new(10);
        let mut scheduler = EmissionScheduler::new();
        scheduler.start(&mut pool);

        let window = run(&mut scheduler, &config, &mut pool, 0.5);
        assert_eq!(window, Some(SpawnWindow { cursor: 0, count: 0 }));
        assert_eq!(scheduler.emitted_total(), 0);

        run(&mut scheduler, &config, &mut pool, 1.0);
        assert_eq!(scheduler.emitted_total(), 5);
    }

    #[test]
    fn test_burst_mode() {
        let mut config = time_config(100, 50);
        config.emitter.spawn_mode = SpawnMode::Burst;
        let mut pool = InstancePool::new(100);
        let mut scheduler = EmissionScheduler::new();
        scheduler.start(&mut pool);

        let window = run(&mut scheduler, &config, &mut pool, 1.0 / 60.0);
        assert_eq!(window, Some(SpawnWindow { cursor: 0, count: 50 }));
        assert_eq!(scheduler.emitted_total(), 50);
        // Burst mode never advances the cursor
        assert_eq!(scheduler.cursor(), 0);

        assert_eq!(run(&mut scheduler, &config, &mut pool, 1.0 / 60.0), None);
        assert_eq!(scheduler.emitted_total(), 50);
    }

    #[test]
    fn test_looping_wraps_cursor() {
        let mut config = time_config(4, 4);
        config.emitter.looping = true;
        let mut pool = InstancePool::new(4);
        let mut scheduler = EmissionScheduler::new();
        scheduler.start(&mut pool);

        run(&mut scheduler, &config, &mut pool, 0.75);
        assert_eq!(scheduler.cursor(), 3);
        run(&mut scheduler, &config, &mut pool, 0.5);
        assert_eq!(scheduler.emitted_total(), 5);
        assert_eq!(scheduler.cursor(), 1);

        // More than one lap in one frame
        let window = run(&mut scheduler, &config, &mut pool, 3.0);
        assert_eq!(window.map(|w| w.count), Some(12));
        assert_eq!(scheduler.cursor(), 1);
        assert_eq!(scheduler.emitted_total(), 17);
    }

    #[test]
    fn test_paused_and_stopped_do_nothing() {
        let config = time_config(10, 10);
        let mut pool = InstancePool::new(10);
        let mut scheduler = EmissionScheduler::new();

        assert_eq!(run(&mut scheduler, &config, &mut pool, 0.5), None);
        assert_eq!(scheduler.clock_time(), 0.0);

        scheduler.start(&mut pool);
        run(&mut scheduler, &config, &mut pool, 0.2);
        scheduler.pause();
        let clock = scheduler.clock_time();
        let emitted = scheduler.emitted_total();
        for _ in 0..5 {
            assert_eq!(run(&mut scheduler, &config, &mut pool, 0.5), None);
        }
        assert_eq!(scheduler.clock_time(), clock);
        assert_eq!(scheduler.emitted_total(), emitted);
    }

    #[test]
    fn test_stop_keeps_state() {
        let config = time_config(10, 10);
        let mut pool = InstancePool::new(10);
        let mut scheduler = EmissionScheduler::new();
        scheduler.start(&mut pool);
        let window = run(&mut scheduler, &config, &mut pool, 0.5);
        let slot = pool.slot(0);

        scheduler.stop();
        assert!(!scheduler.is_visible());
        assert_eq!(scheduler.last_window(), window);
        assert_eq!(scheduler.clock_time(), 0.5);
        assert_eq!(scheduler.cursor(), 5);
        assert_eq!(scheduler.emitted_total(), 5);
        assert_eq!(pool.slot(0), slot);

        scheduler.start(&mut pool);
        assert_eq!(scheduler.last_window(), None);
    }

    #[test]
    fn test_start_resets() {
        let config = time_config(10, 10);
        let mut pool = InstancePool::new(10);
        let mut scheduler = EmissionScheduler::new();
        scheduler.start(&mut pool);
        run(&mut scheduler, &config, &mut pool, 0.5);

        scheduler.start(&mut pool);
        assert_eq!(scheduler.clock_time(), 0.0);
        assert_eq!(scheduler.cursor(), 0);
        assert_eq!(scheduler.emitted_total(), 0);
        assert_eq!(pool.slot(0).map(|s| s.duration), Some(0.0));
    }

    proptest::proptest! {
        #[test]
        fn prop_cursor_in_range_and_total_monotonic(
            capacity in 1u32..64,
            rate in 0u32..200,
            looping: bool,
            burst: bool,
            deltas in proptest::collection::vec(0.0f32..0.5, 1..40),
        ) {
            let mut config = time_config(capacity, rate);
            config.emitter.looping = looping;
            if burst {
                config.emitter.spawn_mode = SpawnMode::Burst;
            }
            let mut pool = InstancePool::new(capacity);
            let mut scheduler = EmissionScheduler::new();
            scheduler.start(&mut pool);

            let mut previous = 0;
            for delta in deltas {
                run(&mut scheduler, &config, &mut pool, delta);
                proptest::prop_assert!(scheduler.cursor() < capacity);
                proptest::prop_assert!(scheduler.emitted_total() >= previous);
                if !looping {
                    proptest::prop_assert!(scheduler.emitted_total() <= u64::from(rate));
                }
                previous = scheduler.emitted_total();
            }
        }
    }
}
