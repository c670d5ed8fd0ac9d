//! Per-instance kinematics.
//!
//! Pure functions of a slot and the frame uniforms: no state, no side
//! effects, safe to evaluate for many instances in parallel.

use std::f32::consts::TAU;

use glam::{Affine3A, Mat3, Vec3};

use crate::config::SimulationConfig;
use crate::easing;
use crate::pool::ParticleSlot;

/// Position of parked (dead or unborn) instances, far outside the view.
pub const PARKED_POSITION: Vec3 = Vec3::new(0.0, 9999.0, 0.0);

/// Frame-wide inputs to the kinematic evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicUniforms {
    /// Simulation clock
    pub time: f32,
    /// Constant acceleration
    pub gravity: Vec3,
    /// Resolved easing ID
    pub easing_id: u32,
    /// Size fade window
    pub fade_size: [f32; 2],
    /// Weight of the current emitter position
    pub static_factor: f32,
    /// Current emitter position
    pub emitter_position: Vec3,
    /// Inverse emitter rotation, when world alignment is enabled
    pub world_alignment: Option<Mat3>,
}

impl KinematicUniforms {
    /// Builds the uniforms for one frame.
    #[must_use]
    pub fn new(config: &SimulationConfig, time: f32, transform: &Affine3A, easing_id: u32) -> Self {
        Self {
            time,
            gravity: config.particles.gravity,
            easing_id,
            fade_size: config.particles.fade_size,
            static_factor: config.emitter.static_factor,
            emitter_position: Vec3::from(transform.translation),
            world_alignment: config
                .emitter
                .world_up_right
                .then(|| inverse_world_rotation(transform)),
        }
    }
}

/// Evaluated state of one instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    /// Instance position
    pub position: Vec3,
    /// Rotation about the view axis, in `[0, 2π)`
    pub rotation: f32,
    /// Instance scale
    pub scale: f32,
    /// Seconds since spawn (reversed for negative speed)
    pub age: f32,
    /// `age / duration`
    pub progress: f32,
    /// Eased progress; 1 when parked
    pub eased_progress: f32,
    /// Whether the instance is outside its lifetime
    pub parked: bool,
}

/// `smoothstep` with Hermite interpolation; equal edges act as a step.
#[must_use]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Age of a slot at `time`. Negative speed plays the lifetime backwards.
#[must_use]
pub fn age(slot: &ParticleSlot, time: f32) -> f32 {
    let elapsed = time - slot.spawn_time;
    if slot.speed < 0.0 {
        slot.duration - elapsed
    } else {
        elapsed
    }
}

/// Rotation about the view axis, wrapped into `[0, 2π)`.
#[must_use]
pub fn rotation(slot: &ParticleSlot, age: f32) -> f32 {
    let initial = (slot.base_rotation.z + 1.0) * 0.5 * TAU;
    let angle = initial + slot.rotation_speed.z * age;
    ((angle % TAU) + TAU) % TAU
}

/// Scale faded in and out over eased progress.
#[must_use]
pub fn scale(fade_size: [f32; 2], base_scale: f32, eased: f32) -> f32 {
    smoothstep(0.0, fade_size[0], eased) * smoothstep(1.01, fade_size[1], eased) * base_scale
}

/// Transpose of the emitter's orthonormalized rotation basis.
#[must_use]
pub fn inverse_world_rotation(transform: &Affine3A) -> Mat3 {
    let m = Mat3::from(transform.matrix3);
    Mat3::from_cols(
        m.x_axis.normalize_or_zero(),
        m.y_axis.normalize_or_zero(),
        m.z_axis.normalize_or_zero(),
    )
    .transpose()
}

/// Evaluates one instance.
#[must_use]
pub fn evaluate(slot: &ParticleSlot, uniforms: &KinematicUniforms) -> Kinematics {
    let age = age(slot, uniforms.time);
    let progress = age / slot.duration;
    let alive = slot.duration > 0.0 && (0.0..=1.0).contains(&progress);
    let parked = !alive;

    let rotation = rotation(slot, age);

    if parked {
        return Kinematics {
            position: PARKED_POSITION,
            rotation,
            scale: scale(uniforms.fade_size, slot.base_scale, 1.0),
            age,
            progress,
            eased_progress: 1.0,
            parked,
        };
    }

    let eased = easing::evaluate(uniforms.easing_id, progress);
    let direction = slot.direction.normalize_or_zero();
    let travel = direction * (eased * slot.duration) * slot.speed.abs();
    let mut offset = travel + 0.5 * uniforms.gravity * age * age;
    if let Some(alignment) = uniforms.world_alignment {
        offset = offset.lerp(alignment * offset, eased);
    }

    Kinematics {
        position: slot.base_position + uniforms.emitter_position * uniforms.static_factor + offset,
        rotation,
        scale: scale(uniforms.fade_size, slot.base_scale, eased),
        age,
        progress,
        eased_progress: eased,
        parked,
    }
}
