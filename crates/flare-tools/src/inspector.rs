//! Instance pool inspection tools.

use flare_kernel::{
    kinematics, InstancePool, Kinematics, ParticleSlot, RandomSource, Simulation,
};

/// Where a slot stands relative to its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotPhase {
    /// Lifetime is zeroed (never populated since start)
    NeverSpawned,
    /// Spawn time lies in the future
    Unborn,
    /// Within its lifetime
    Live,
    /// Lifetime has elapsed
    Expired,
}

/// Classifies a slot at clock `time`. Independent of the speed sign.
#[must_use]
pub fn classify(slot: &ParticleSlot, time: f32) -> SlotPhase {
    if slot.spawn_time == 0.0 && slot.duration == 0.0 {
        return SlotPhase::NeverSpawned;
    }
    let elapsed = time - slot.spawn_time;
    if elapsed < 0.0 {
        SlotPhase::Unborn
    } else if slot.duration > 0.0 && elapsed <= slot.duration {
        SlotPhase::Live
    } else {
        SlotPhase::Expired
    }
}

/// Slot inspection data.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotInfo {
    /// Pool index
    pub index: usize,
    /// Raw slot record
    pub slot: ParticleSlot,
    /// Evaluated kinematics at inspection time
    pub kinematics: Kinematics,
    /// Lifetime phase
    pub phase: SlotPhase,
}

/// Pool-wide counts by phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolSummary {
    /// Slot count
    pub capacity: u32,
    /// Slots within their lifetime
    pub live: usize,
    /// Slots spawned with a future spawn time
    pub unborn: usize,
    /// Slots whose lifetime has elapsed
    pub expired: usize,
    /// Slots not populated since start
    pub never_spawned: usize,
    /// Attribute groups awaiting upload
    pub dirty_groups: usize,
}

impl PoolSummary {
    /// Counts slot phases at clock `time`.
    #[must_use]
    pub fn collect(pool: &InstancePool, time: f32) -> Self {
        let mut summary = Self {
            capacity: pool.capacity(),
            dirty_groups: pool.attributes().iter().filter(|a| a.dirty).count(),
            ..Self::default()
        };
        for slot in (0..pool.len()).filter_map(|i| pool.slot(i)) {
            match classify(&slot, time) {
                SlotPhase::NeverSpawned => summary.never_spawned += 1,
                SlotPhase::Unborn => summary.unborn += 1,
                SlotPhase::Live => summary.live += 1,
                SlotPhase::Expired => summary.expired += 1,
            }
        }
        summary
    }

    /// Slots that are not live.
    #[must_use]
    pub const fn parked(&self) -> usize {
        self.unborn + self.expired + self.never_spawned
    }
}

/// Inspector for examining an emitter's pool.
#[derive(Debug, Default)]
pub struct PoolInspector {
    /// Currently selected slot (if any)
    selected: Option<SlotInfo>,
    /// Most recent pool summary
    summary: Option<PoolSummary>,
}

impl PoolInspector {
    /// Creates a new inspector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a slot, evaluating it at the simulation's current clock.
    pub fn select_slot<R: RandomSource>(
        &mut self,
        sim: &Simulation<R>,
        index: usize,
    ) -> Option<&SlotInfo> {
        let slot = sim.pool().slot(index)?;
        let kinematics = kinematics::evaluate(&slot, &sim.kinematic_uniforms());
        self.selected = Some(SlotInfo {
            index,
            slot,
            kinematics,
            phase: classify(&slot, sim.clock_time()),
        });
        self.selected.as_ref()
    }

    /// Clears slot selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Returns the selected slot info.
    #[must_use]
    pub fn selected_slot(&self) -> Option<&SlotInfo> {
        self.selected.as_ref()
    }

    /// Recomputes the pool summary.
    pub fn refresh<R: RandomSource>(&mut self, sim: &Simulation<R>) -> PoolSummary {
        let summary = PoolSummary::collect(sim.pool(), sim.clock_time());
        self.summary = Some(summary);
        summary
    }

    /// Returns the most recent pool summary.
    #[must_use]
    pub fn summary(&self) -> Option<&PoolSummary> {
        self.summary.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flare_kernel::SimulationConfig;

    fn simulation() -> Simulation {
        let mut config = SimulationConfig::default();
        config.particles.count = 10;
        config.emitter.rate = 10;
        config.emitter.lifetime = [0.5, 0.5];
        Simulation::configure_seeded(config, 9).expect("valid config")
    }

    #[test]
    fn test_classify() {
        let slot = ParticleSlot {
            spawn_time: 1.0,
            duration: 2.0,
            ..Default::default()
        };
        assert_eq!(classify(&ParticleSlot::default(), 5.0), SlotPhase::NeverSpawned);
        assert_eq!(classify(&slot, 0.5), SlotPhase::Unborn);
        assert_eq!(classify(&slot, 2.0), SlotPhase::Live);
        assert_eq!(classify(&slot, 3.5), SlotPhase::Expired);

        let reversed = ParticleSlot { speed: -1.0, ..slot };
        assert_eq!(classify(&reversed, 0.5), SlotPhase::Unborn);
    }

    #[test]
    fn test_summary_counts() {
        let mut sim = simulation();
        sim.start();
        sim.update(0.3);
        sim.update(0.3);

        let mut inspector = PoolInspector::new();
        let summary = inspector.refresh(&sim);
        // 3 spawned at t=0, 3 more at t=0.3, evaluated at t=0.6
        assert_eq!(summary.capacity, 10);
        assert_eq!(summary.expired, 3);
        assert_eq!(summary.live, 3);
        assert_eq!(summary.never_spawned, 4);
        assert_eq!(summary.parked(), 7);
        assert_eq!(summary.dirty_groups, 7);
        assert_eq!(inspector.summary(), Some(&summary));
    }

    #[test]
    fn test_select_slot() {
        let mut sim = simulation();
        sim.start();
        sim.update(0.3);

        let mut inspector = PoolInspector::new();
        let info = inspector.select_slot(&sim, 0).expect("slot in range").clone();
        assert_eq!(info.phase, SlotPhase::Live);
        assert!(!info.kinematics.parked);

        assert!(inspector.select_slot(&sim, 99).is_none());
        assert_eq!(inspector.selected_slot(), Some(&info));
        inspector.clear_selection();
        assert!(inspector.selected_slot().is_none());
    }
}
