//! Randomized per-slot attribute generation.
//!
//! Each spawned slot draws its attributes from the emitter ranges in a fixed
//! order: position, rotation, size, direction, rotation speed, lifetime,
//! alpha-map indices, speed, gradient row. The order matters for
//! reproducibility with a seeded [`RandomSource`].

use glam::Vec3;

use crate::config::SimulationConfig;
use crate::pool::ParticleSlot;

/// Uniform random numbers in `[0, 1)`.
pub trait RandomSource {
    /// Next uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f32;

    /// `r * (max - min) + min`. `min > max` is accepted as is.
    fn rand_float(&mut self, min: f32, max: f32) -> f32 {
        self.next_unit() * (max - min) + min
    }

    /// `floor(r * (max - min + 1)) + min`, inclusive of both ends.
    fn rand_int(&mut self, min: u32, max: u32) -> u32 {
        let span = max.saturating_sub(min) as f32 + 1.0;
        (self.next_unit() * span).floor() as u32 + min
    }
}

impl RandomSource for fastrand::Rng {
    fn next_unit(&mut self) -> f32 {
        self.f32()
    }
}

fn rand_vec3<R: RandomSource + ?Sized>(rng: &mut R, min: Vec3, max: Vec3) -> Vec3 {
    let x = rng.rand_float(min.x, max.x);
    let y = rng.rand_float(min.y, max.y);
    let z = rng.rand_float(min.z, max.z);
    Vec3::new(x, y, z)
}

/// Builds the slot record for one spawned particle.
///
/// `origin` is the emitter position at spawn; it contributes with weight
/// `1 - static`. `now` becomes the slot's spawn time.
pub fn populate<R: RandomSource + ?Sized>(
    rng: &mut R,
    config: &SimulationConfig,
    origin: Vec3,
    now: f32,
) -> ParticleSlot {
    let emitter = &config.emitter;
    let particles = &config.particles;

    let sampled = rand_vec3(rng, emitter.start_position_min, emitter.start_position_max);
    let base_position = sampled + origin * (1.0 - emitter.static_factor);
    let base_rotation = rand_vec3(rng, emitter.start_rotation_min, emitter.start_rotation_max);
    let base_scale = rng.rand_float(emitter.size[0], emitter.size[1]);
    let direction = rand_vec3(rng, emitter.direction_min, emitter.direction_max);
    let rotation_speed = rand_vec3(rng, emitter.rotation_speed_min, emitter.rotation_speed_max);
    let duration = rng.rand_float(emitter.lifetime[0], emitter.lifetime[1]);

    let starts = particles.alpha_maps_start.len() as u32;
    let ends = particles.alpha_maps_end.len() as u32;
    let alpha_map_start = if starts > 0 {
        rng.rand_int(0, starts - 1)
    } else {
        0
    };
    let alpha_map_end = if ends > 0 {
        starts + rng.rand_int(0, ends - 1)
    } else if starts > 0 {
        rng.rand_int(0, starts - 1)
    } else {
        0
    };

    let speed = rng.rand_float(emitter.speed[0], emitter.speed[1]);

    let rows = particles.colors.len().max(1) as u32;
    let gradient_row = rng.rand_int(0, rows - 1).min(rows - 1);

    ParticleSlot {
        base_position,
        base_rotation,
        base_scale,
        direction,
        rotation_speed,
        spawn_time: now,
        duration,
        alpha_map_start,
        alpha_map_end,
        speed,
        gradient_row,
    }
}

/// Replays a fixed sequence of samples, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    samples: Vec<f32>,
    next: usize,
}

impl ScriptedSource {
    /// Creates a source over `samples`; an empty list always yields 0.
    #[must_use]
    pub fn new(samples: impl Into<Vec<f32>>) -> Self {
        Self {
            samples: samples.into(),
            next: 0,
        }
    }

    /// Number of samples drawn so far.
    #[must_use]
    pub const fn drawn(&self) -> usize {
        self.next
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let value = self.samples[self.next % self.samples.len()];
        self.next += 1;
        value
    }
}
