//! # Flare Kernel
//!
//! Particle emission and per-instance evaluation.
//!
//! This crate provides the core of the particle system:
//! - Easing library (40 functions dispatched by integer ID)
//! - Simulation configuration with defaults and partial patches
//! - Fixed-capacity instance pool with Pod attribute buffers
//! - Emission scheduler (time and burst modes, looping, delay)
//! - Randomized attribute generation
//! - Kinematic evaluation (position, rotation, scale, parking)
//! - Color and alpha evaluation with gradient and alpha-map samplers
//!
//! ## Architecture
//!
//! The host owns one [`Simulation`] per emitter and calls `update(delta)`
//! once per frame. The scheduler decides how many slots to (re)populate, the
//! generator fills them, and the pool flags its buffers for upload.
//! Rendering evaluates every instance from the slot data and frame uniforms
//! alone; evaluation never mutates state and can run in parallel.
//!
//! ## Parking
//!
//! Slots are never removed. An instance outside its lifetime (unborn,
//! expired, or never spawned) is moved to [`PARKED_POSITION`] until the
//! scheduler reuses its slot.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod atlas;
pub mod attributes;
pub mod config;
pub mod easing;
pub mod gradient;
pub mod kinematics;
pub mod pool;
pub mod scheduler;
pub mod shading;
pub mod simulation;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::atlas::*;
    pub use crate::attributes::*;
    pub use crate::config::*;
    pub use crate::easing::Easing;
    pub use crate::gradient::*;
    pub use crate::kinematics::{smoothstep, KinematicUniforms, Kinematics, PARKED_POSITION};
    pub use crate::pool::*;
    pub use crate::scheduler::*;
    pub use crate::shading::ShadingContext;
    pub use crate::simulation::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn emitter(count: u32, rate: u32) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.particles.count = count;
        config.emitter.rate = rate;
        config.emitter.duration = 1.0;
        config
    }

    #[test]
    fn test_time_mode_emits_rate_over_duration() {
        let mut sim = Simulation::configure_seeded(emitter(10, 10), 42).expect("valid config");
        sim.start();

        sim.update(0.5);
        assert_eq!(sim.emitted_total(), 5);
        assert!(sim.pool().any_dirty());

        sim.update(0.5);
        assert_eq!(sim.emitted_total(), 10);

        sim.pool_mut().take_dirty();
        sim.update(0.5);
        assert_eq!(sim.emitted_total(), 10);
        assert!(!sim.pool().any_dirty());
    }

    #[test]
    fn test_burst_mode_emits_once() {
        let mut config = emitter(100, 50);
        config.emitter.spawn_mode = SpawnMode::Burst;
        let mut sim = Simulation::configure_seeded(config, 42).expect("valid config");
        sim.start();

        sim.update(1.0 / 60.0);
        assert_eq!(sim.emitted_total(), 50);
        for _ in 0..60 {
            sim.update(1.0 / 60.0);
        }
        assert_eq!(sim.emitted_total(), 50);
    }

    #[test]
    fn test_reversed_playback_age() {
        let mut config = emitter(4, 4);
        config.emitter.lifetime = [2.0, 2.0];
        config.emitter.speed = [-3.0, -3.0];
        let mut sim = Simulation::configure_seeded(config, 42).expect("valid config");
        sim.start();

        sim.update(0.25);
        sim.update(0.25);
        let first = sim.evaluate_instance(0).expect("slot in range");
        assert!((first.kinematics.age - 1.5).abs() < 1e-6);
        assert!((first.kinematics.progress - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_pause_freezes_evaluation() {
        let mut config = emitter(32, 32);
        config.emitter.looping = true;
        config.particles.gravity = Vec3::new(0.0, -9.8, 0.0);
        let mut sim = Simulation::configure_seeded(config, 42).expect("valid config");
        sim.start();
        sim.update(0.3);

        sim.pause();
        let frozen = sim.evaluate_all();
        let clock = sim.clock_time();
        for _ in 0..10 {
            sim.update(0.1);
        }
        assert_eq!(sim.clock_time(), clock);
        assert_eq!(sim.evaluate_all(), frozen);

        sim.resume();
        sim.update(0.1);
        assert!(sim.clock_time() > clock);
    }

    #[test]
    fn test_expired_particles_are_parked() {
        let mut config = emitter(4, 4);
        config.emitter.lifetime = [0.5, 0.5];
        let mut sim = Simulation::configure_seeded(config, 42).expect("valid config");
        sim.start();

        sim.update(0.25);
        assert!(!sim.evaluate_instance(0).expect("slot in range").kinematics.parked);

        sim.update(0.5);
        let expired = sim.evaluate_instance(0).expect("slot in range");
        assert!(expired.kinematics.parked);
        assert_eq!(expired.kinematics.position, PARKED_POSITION);
        assert_eq!(expired.kinematics.eased_progress, 1.0);
    }

    #[test]
    fn test_stop_then_start_restarts_emission() {
        let mut sim = Simulation::configure_seeded(emitter(10, 10), 42).expect("valid config");
        sim.start();
        sim.update(1.0);
        sim.stop();
        assert_eq!(sim.update(0.5), None);

        sim.start();
        assert_eq!(sim.emitted_total(), 0);
        assert!(sim
            .evaluate_all()
            .iter()
            .all(|sample| sample.kinematics.parked));
        sim.update(0.5);
        assert_eq!(sim.emitted_total(), 5);
    }

    proptest::proptest! {
        #[test]
        fn prop_live_instances_within_capacity(
            seed: u64,
            capacity in 1u32..40,
            rate in 1u32..120,
            looping: bool,
            steps in proptest::collection::vec(0.0f32..0.2, 1..30),
        ) {
            let mut config = emitter(capacity, rate);
            config.emitter.looping = looping;
            let mut sim = Simulation::configure_seeded(config, seed).expect("valid config");
            sim.start();
            for delta in steps {
                sim.update(delta);
                let samples = sim.evaluate_all();
                proptest::prop_assert_eq!(samples.len(), capacity as usize);
                for sample in samples {
                    if !sample.kinematics.parked {
                        proptest::prop_assert!((0.0..=1.0).contains(&sample.kinematics.progress));
                    }
                }
            }
        }
    }
}
