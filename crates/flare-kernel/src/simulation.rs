//! Particle simulation facade.
//!
//! A [`Simulation`] owns one emitter: its configuration, instance pool,
//! emission scheduler, random source and the samplers used for shading.
//! The host drives it once per frame with [`Simulation::update`] and reads
//! instances back through the evaluation methods or the pool's attribute
//! buffers.

use std::sync::Arc;

use flare_common::{ConfigError, FlareResult};
use glam::{Affine3A, Vec2, Vec3, Vec4};
use tracing::{debug, info, warn};

use crate::atlas::{AlphaSampler, AtlasProvider};
use crate::attributes::RandomSource;
use crate::config::{AlphaMapHandle, SimulationConfig, SimulationConfigPatch};
use crate::easing::Easing;
use crate::gradient::{GradientProvider, GradientSampler, LinearGradient};
use crate::kinematics::{self, KinematicUniforms, Kinematics};
use crate::pool::InstancePool;
use crate::scheduler::{EmissionScheduler, EmitterState, SpawnWindow};
use crate::shading::{self, ShadingContext};

/// Per-instance evaluation result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceSample {
    /// Pool index
    pub index: usize,
    /// Position, rotation, scale and progress
    pub kinematics: Kinematics,
    /// Gradient color times intensity
    pub color: Vec3,
    /// Fade alpha before alpha maps
    pub alpha: f32,
}

/// A single particle emitter.
#[derive(Debug)]
pub struct Simulation<R: RandomSource = fastrand::Rng> {
    config: SimulationConfig,
    easing: Easing,
    pool: InstancePool,
    scheduler: EmissionScheduler,
    rng: R,
    transform: Affine3A,
    gradient: Arc<dyn GradientSampler>,
    atlas: Option<Arc<dyn AlphaSampler>>,
    warned_missing_atlas: bool,
    disposed: bool,
}

fn resolve_easing(name: &str) -> Easing {
    Easing::from_name(name).unwrap_or_else(|| {
        warn!("Unknown easing function \"{}\", using linear", name);
        Easing::Linear
    })
}

impl Simulation<fastrand::Rng> {
    /// Validates `config` and builds a stopped simulation with an entropy-seeded RNG.
    pub fn configure(config: SimulationConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, fastrand::Rng::new())
    }

    /// Like [`Simulation::configure`] with a fixed seed, for reproducible runs.
    pub fn configure_seeded(config: SimulationConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, fastrand::Rng::with_seed(seed))
    }
}

impl<R: RandomSource> Simulation<R> {
    /// Validates `config` and builds a stopped simulation drawing from `rng`.
    pub fn with_rng(config: SimulationConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let gradient = LinearGradient::from_rows(&config.particles.colors)?;
        let easing = resolve_easing(&config.particles.ease_function);
        let pool = InstancePool::new(config.particles.count);

        info!(
            "Configured emitter: {} slots, {} particles per {:.2}s ({:?}{}), easing {}",
            config.particles.count,
            config.emitter.rate,
            config.emitter.duration,
            config.emitter.spawn_mode,
            if config.emitter.looping { ", looping" } else { "" },
            easing.name()
        );

        Ok(Self {
            config,
            easing,
            pool,
            scheduler: EmissionScheduler::new(),
            rng,
            transform: Affine3A::IDENTITY,
            gradient: Arc::new(gradient),
            atlas: None,
            warned_missing_atlas: false,
            disposed: false,
        })
    }

    /// Resets the clock, parks every slot and begins emitting.
    pub fn start(&mut self) {
        if self.disposed {
            warn!("start() called on a disposed simulation");
            return;
        }
        if self.config.particles.alpha_map_count() > 0
            && self.atlas.is_none()
            && !self.warned_missing_atlas
        {
            warn!(
                "{} alpha maps configured but no atlas attached; sampling alpha 1",
                self.config.particles.alpha_map_count()
            );
            self.warned_missing_atlas = true;
        }
        self.scheduler.start(&mut self.pool);
        info!("Emitter started");
    }

    /// Freezes the clock; instances keep their current state.
    pub fn pause(&mut self) {
        self.scheduler.pause();
    }

    /// Continues after [`Simulation::pause`].
    pub fn resume(&mut self) {
        self.scheduler.resume();
    }

    /// Stops emitting and hides the emitter.
    pub fn stop(&mut self) {
        self.scheduler.stop();
        info!(
            "Emitter stopped after {} particles",
            self.scheduler.emitted_total()
        );
    }

    /// Advances the simulation by `delta` seconds.
    ///
    /// Returns the spawn window when slots were (re)populated this frame.
    pub fn update(&mut self, delta: f32) -> Option<SpawnWindow> {
        if self.disposed {
            return None;
        }
        if !delta.is_finite() {
            warn!("Ignoring non-finite frame delta {}", delta);
            return None;
        }
        let origin = Vec3::from(self.transform.translation);
        let window = self.scheduler.update(
            delta,
            &self.config,
            &mut self.pool,
            &mut self.rng,
            origin,
        );
        if let Some(window) = window.filter(|w| w.count > 0) {
            debug!(
                "Spawn window cursor={} count={} t={:.3}",
                window.cursor,
                window.count,
                self.scheduler.clock_time()
            );
        }
        window
    }

    /// Shallow-merges `patch` into the configuration.
    ///
    /// Easing and gradient are re-resolved. The pool is never resized: a
    /// `count` change is logged and ignored. On error the configuration is
    /// left untouched.
    pub fn update_config(&mut self, patch: SimulationConfigPatch) -> Result<(), ConfigError> {
        let mut next = self.config.clone();
        patch.apply_to(&mut next);

        if next.particles.count != self.pool.capacity() {
            warn!(
                "Particle count change {} -> {} ignored; pool size is fixed",
                self.pool.capacity(),
                next.particles.count
            );
            next.particles.count = self.pool.capacity();
        }
        next.validate()?;

        if next.particles.colors != self.config.particles.colors {
            self.gradient = Arc::new(LinearGradient::from_rows(&next.particles.colors)?);
        }
        if next.particles.alpha_maps_start != self.config.particles.alpha_maps_start
            || next.particles.alpha_maps_end != self.config.particles.alpha_maps_end
        {
            debug!("Alpha maps changed; detaching atlas");
            self.atlas = None;
            self.warned_missing_atlas = false;
        }
        self.easing = resolve_easing(&next.particles.ease_function);
        self.config = next;
        debug!("Configuration updated");
        Ok(())
    }

    /// Stops the emitter and releases the pool and samplers. Further updates
    /// are no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.scheduler.stop();
        self.pool.release();
        self.atlas = None;
        self.disposed = true;
        info!("Emitter disposed");
    }

    /// Sets the emitter's world transform.
    pub fn set_transform(&mut self, transform: Affine3A) {
        self.transform = transform;
    }

    /// Attaches an alpha-map atlas.
    pub fn set_alpha_atlas(&mut self, atlas: Arc<dyn AlphaSampler>) {
        self.atlas = Some(atlas);
    }

    /// Builds and attaches the atlas for the configured alpha maps.
    pub fn load_alpha_atlas(&mut self, provider: &dyn AtlasProvider) -> FlareResult<()> {
        let maps: Vec<AlphaMapHandle> = self
            .config
            .particles
            .alpha_maps_start
            .iter()
            .chain(&self.config.particles.alpha_maps_end)
            .cloned()
            .collect();
        self.atlas = provider.atlas(&maps, self.config.render.alpha_map_size)?;
        Ok(())
    }

    /// Replaces the gradient sampler until the colors change.
    pub fn set_gradient_sampler(&mut self, gradient: Arc<dyn GradientSampler>) {
        self.gradient = gradient;
    }

    /// Rebuilds the gradient sampler from the configured colors.
    pub fn load_gradient(&mut self, provider: &dyn GradientProvider) -> Result<(), ConfigError> {
        self.gradient = provider.gradient(&self.config.particles.colors)?;
        Ok(())
    }

    /// Frame uniforms for kinematic evaluation.
    #[must_use]
    pub fn kinematic_uniforms(&self) -> KinematicUniforms {
        KinematicUniforms::new(
            &self.config,
            self.scheduler.clock_time(),
            &self.transform,
            self.easing.id(),
        )
    }

    /// Frame inputs for shading.
    #[must_use]
    pub fn shading_context(&self) -> ShadingContext<'_> {
        ShadingContext::new(&self.config, self.gradient.as_ref(), self.atlas.as_deref())
    }

    fn sample(
        &self,
        index: usize,
        uniforms: &KinematicUniforms,
        ctx: &ShadingContext<'_>,
    ) -> Option<InstanceSample> {
        let slot = self.pool.slot(index)?;
        let kinematics = kinematics::evaluate(&slot, uniforms);
        let eased = kinematics.eased_progress;
        Some(InstanceSample {
            index,
            kinematics,
            color: shading::color(&slot, eased, ctx),
            alpha: shading::base_alpha(ctx.fade_alpha, eased),
        })
    }

    /// Evaluates one instance at the current clock time.
    #[must_use]
    pub fn evaluate_instance(&self, index: usize) -> Option<InstanceSample> {
        self.sample(index, &self.kinematic_uniforms(), &self.shading_context())
    }

    /// Evaluates every instance at the current clock time.
    #[must_use]
    pub fn evaluate_all(&self) -> Vec<InstanceSample> {
        let uniforms = self.kinematic_uniforms();
        let ctx = self.shading_context();
        (0..self.pool.len())
            .filter_map(|index| self.sample(index, &uniforms, &ctx))
            .collect()
    }

    /// Final RGBA of one fragment of an evaluated instance, or `None` when
    /// the fragment is discarded.
    #[must_use]
    pub fn shade_fragment(&self, sample: &InstanceSample, uv: Vec2) -> Option<Vec4> {
        let slot = self.pool.slot(sample.index)?;
        shading::fragment_alpha(
            &slot,
            sample.alpha,
            sample.kinematics.eased_progress,
            uv,
            &self.shading_context(),
        )
        .map(|alpha| sample.color.extend(alpha))
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Resolved easing function.
    #[must_use]
    pub const fn easing(&self) -> Easing {
        self.easing
    }

    /// Instance pool.
    #[must_use]
    pub const fn pool(&self) -> &InstancePool {
        &self.pool
    }

    /// Instance pool, for clearing dirty flags after upload.
    pub fn pool_mut(&mut self) -> &mut InstancePool {
        &mut self.pool
    }

    /// Emitter world transform.
    #[must_use]
    pub const fn transform(&self) -> &Affine3A {
        &self.transform
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> EmitterState {
        self.scheduler.state()
    }

    /// Whether the emitter is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Whether the emitter should be drawn.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.scheduler.is_visible()
    }

    /// Whether the emitter debug marker should be drawn.
    #[must_use]
    pub const fn debug_visible(&self) -> bool {
        self.config.emitter.debug && self.scheduler.is_visible()
    }

    /// Whether [`Simulation::dispose`] has been called.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Emission clock in seconds.
    #[must_use]
    pub const fn clock_time(&self) -> f32 {
        self.scheduler.clock_time()
    }

    /// Next slot index to write.
    #[must_use]
    pub const fn cursor(&self) -> u32 {
        self.scheduler.cursor()
    }

    /// Particles spawned since the last start.
    #[must_use]
    pub const fn emitted_total(&self) -> u64 {
        self.scheduler.emitted_total()
    }

    /// Spawn window of the most recent running frame.
    #[must_use]
    pub const fn spawn_window(&self) -> Option<SpawnWindow> {
        self.scheduler.last_window()
    }
}
