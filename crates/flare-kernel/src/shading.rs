//! Per-instance color and per-fragment alpha.
//!
//! Color is the particle's gradient row sampled at its eased progress, scaled
//! by intensity. Alpha is a fade-in/fade-out window over eased progress,
//! multiplied by either a procedural soft circle (no alpha maps) or the
//! alpha-map atlas, morphing from the start map to the end map.

use glam::{Vec2, Vec3, Vec4};

use crate::atlas::AlphaSampler;
use crate::config::SimulationConfig;
use crate::gradient::GradientSampler;
use crate::kinematics::smoothstep;
use crate::pool::ParticleSlot;

/// Radius of the procedural circle, in uv units.
pub const CIRCLE_RADIUS: f32 = 0.5;

/// Width of the procedural circle's soft edge.
pub const CIRCLE_FEATHER: f32 = 0.98;

/// Fragments whose circle alpha falls below this are discarded.
pub const DISCARD_THRESHOLD: f32 = 0.01;

/// Frame-wide inputs to shading.
#[derive(Debug, Clone, Copy)]
pub struct ShadingContext<'a> {
    /// Color multiplier
    pub intensity: f32,
    /// Alpha fade window
    pub fade_alpha: [f32; 2],
    /// Start-to-end alpha-map morph window
    pub fade_alpha_map: [f32; 2],
    /// Number of atlas cells
    pub alpha_map_count: u32,
    /// Gradient rows
    pub gradient: &'a dyn GradientSampler,
    /// Alpha-map atlas, when one is attached
    pub atlas: Option<&'a dyn AlphaSampler>,
}

impl<'a> ShadingContext<'a> {
    /// Builds the context from the configuration and attached samplers.
    #[must_use]
    pub fn new(
        config: &SimulationConfig,
        gradient: &'a dyn GradientSampler,
        atlas: Option<&'a dyn AlphaSampler>,
    ) -> Self {
        Self {
            intensity: config.particles.intensity,
            fade_alpha: config.particles.fade_alpha,
            fade_alpha_map: config.particles.fade_alpha_map,
            alpha_map_count: config.particles.alpha_map_count() as u32,
            gradient,
            atlas,
        }
    }
}

/// Gradient color for an instance.
#[must_use]
pub fn color(slot: &ParticleSlot, eased: f32, ctx: &ShadingContext<'_>) -> Vec3 {
    ctx.gradient.sample(slot.gradient_row as usize, eased) * ctx.intensity
}

/// Fade-in/fade-out alpha over eased progress.
#[must_use]
pub fn base_alpha(fade_alpha: [f32; 2], eased: f32) -> f32 {
    smoothstep(0.0, fade_alpha[0], eased) * smoothstep(1.01, fade_alpha[1], eased)
}

/// Soft circle centered in the quad, fading to 0 at the radius.
#[must_use]
pub fn circle_alpha(uv: Vec2) -> f32 {
    let dist = uv.distance(Vec2::splat(0.5));
    1.0 - smoothstep(CIRCLE_RADIUS - CIRCLE_FEATHER, CIRCLE_RADIUS, dist)
}

fn atlas_alpha(atlas: Option<&dyn AlphaSampler>, cell: u32, count: u32, uv: Vec2) -> f32 {
    atlas.map_or(1.0, |atlas| {
        let u = (cell as f32 + uv.x) / count as f32;
        atlas.sample_alpha(Vec2::new(u, uv.y))
    })
}

/// Final alpha of one fragment, or `None` when it is discarded.
#[must_use]
pub fn fragment_alpha(
    slot: &ParticleSlot,
    base: f32,
    eased: f32,
    uv: Vec2,
    ctx: &ShadingContext<'_>,
) -> Option<f32> {
    match ctx.alpha_map_count {
        0 => {
            let circle = circle_alpha(uv);
            (circle >= DISCARD_THRESHOLD).then_some(circle * base)
        }
        1 => Some(atlas_alpha(ctx.atlas, slot.alpha_map_start, 1, uv) * base),
        count => {
            let start = atlas_alpha(ctx.atlas, slot.alpha_map_start, count, uv);
            let end = atlas_alpha(ctx.atlas, slot.alpha_map_end, count, uv);
            let morph = smoothstep(ctx.fade_alpha_map[0], ctx.fade_alpha_map[1], eased);
            Some((start + (end - start) * morph) * base)
        }
    }
}

/// Shades one fragment: RGB from the gradient, alpha from fades and maps.
#[must_use]
pub fn shade(slot: &ParticleSlot, eased: f32, uv: Vec2, ctx: &ShadingContext<'_>) -> Option<Vec4> {
    let rgb = color(slot, eased, ctx);
    let base = base_alpha(ctx.fade_alpha, eased);
    fragment_alpha(slot, base, eased, uv, ctx).map(|alpha| rgb.extend(alpha))
}
