//! Headless host loop.
//!
//! Owns one [`Simulation`] built from an exported emitter and drives it frame
//! by frame: update, evaluate every instance, shade one fragment per live
//! instance, then hand the dirty attribute groups off as if uploading them.

use std::path::Path;

use anyhow::{Context, Result};
use flare_kernel::{AlphaMapHandle, DirectoryAtlasProvider, LinearGradient, Simulation};
use flare_tools::{resolve, resolve_with, ExportDocument, PerfTracker, PoolInspector, PoolSummary};
use glam::{Affine3A, Vec2};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::timing::FrameTiming;

/// Width of the gradient preview image.
const GRADIENT_PREVIEW_WIDTH: u32 = 256;

/// Outcome of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Simulation steps taken
    pub frames: u32,
    /// Particles emitted since start
    pub emitted_total: u64,
    /// Pool occupancy after the last step
    pub summary: PoolSummary,
}

/// A running emitter with its diagnostics.
struct Host {
    sim: Simulation,
    inspector: PoolInspector,
    tracker: PerfTracker,
    uploads: usize,
}

impl Host {
    fn new(config: &EngineConfig) -> Result<Self> {
        let document = ExportDocument::load(&config.project_file)
            .with_context(|| format!("loading {}", config.project_file.display()))?;

        let resolved = if config.alpha_map_dir.is_some() {
            resolve_with(&document, &config.project_id, &config.emitter_id, |path| {
                AlphaMapHandle::new(path.to_owned())
            })?
        } else {
            resolve(&document, &config.project_id, &config.emitter_id)?
        };

        let mut sim = match config.seed {
            Some(seed) => Simulation::configure_seeded(resolved.config, seed)?,
            None => Simulation::configure(resolved.config)?,
        };

        if let Some(position) = config.emitter_position.or(resolved.position) {
            sim.set_transform(Affine3A::from_translation(position));
        }

        if let Some(dir) = &config.alpha_map_dir {
            sim.load_alpha_atlas(&DirectoryAtlasProvider::new(dir))?;
        }

        if let Some(path) = &config.gradient_preview {
            LinearGradient::from_rows(&sim.config().particles.colors)?
                .bake(GRADIENT_PREVIEW_WIDTH)
                .save(path)
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Wrote gradient preview to {}", path.display());
        }

        info!(
            "Emitter \"{}/{}\": {} slots, easing {}",
            config.project_id,
            config.emitter_id,
            sim.pool().capacity(),
            sim.easing().name()
        );

        Ok(Self {
            sim,
            inspector: PoolInspector::new(),
            tracker: PerfTracker::new(config.frame_rate),
            uploads: 0,
        })
    }

    /// Runs one simulation step and returns the number of shaded fragments.
    fn step(&mut self, delta: f32) -> usize {
        let Self { sim, tracker, .. } = self;
        let shaded = tracker.measure(|| {
            sim.update(delta);
            sim.evaluate_all()
                .iter()
                .filter(|sample| !sample.kinematics.parked)
                .filter_map(|sample| sim.shade_fragment(sample, Vec2::splat(0.5)))
                .count()
        });
        self.uploads += self.sim.pool_mut().take_dirty();
        shaded
    }

    fn report(&mut self, frame: u32, shaded: usize) -> PoolSummary {
        let summary = self.inspector.refresh(&self.sim);
        let stats = self.tracker.stats(&summary, self.sim.emitted_total());
        info!(
            "frame {frame}: t={:.2}s live={}/{} emitted={} shaded={shaded} cost={:.3}ms (worst {:.3}ms)",
            self.sim.clock_time(),
            stats.live_instances,
            stats.capacity,
            stats.emitted_total,
            stats.frame_time_ms,
            stats.worst_frame_time_ms,
        );
        if !self.tracker.is_within_budget() {
            warn!("Average frame cost exceeds the frame budget");
        }
        summary
    }

    fn run(mut self, config: &EngineConfig) -> RunReport {
        let mut timing = FrameTiming::new(config.frame_rate);
        let report_every = config.report_every.max(1);
        let mut frames = 0;
        let mut shaded = 0;

        self.sim.start();
        timing.reset();

        while frames < config.frames {
            let steps = if config.realtime {
                timing.sleep_remainder();
                let dt = timing.delta_time();
                timing.accumulate(dt)
            } else {
                1
            };

            for _ in 0..steps.min(config.frames - frames) {
                shaded = self.step(timing.fixed_dt());
                frames += 1;
                if frames % report_every == 0 {
                    self.report(frames, shaded);
                }
            }
        }

        let summary = self.report(frames, shaded);
        debug!("{} attribute uploads", self.uploads);

        let report = RunReport {
            frames,
            emitted_total: self.sim.emitted_total(),
            summary,
        };
        self.sim.dispose();
        report
    }
}

/// Runs the emitter selected by `config`.
pub fn run_with(config: &EngineConfig) -> Result<RunReport> {
    let host = Host::new(config)?;
    Ok(host.run(config))
}

/// Loads the configuration at `config_path` and runs it.
pub fn run(config_path: &Path) -> Result<()> {
    let mut config = EngineConfig::load_from(config_path);
    config.validate();

    info!("Configuration loaded:");
    info!("  Export: {}", config.project_file.display());
    info!("  Frames: {} at {} Hz", config.frames, config.frame_rate);

    let report = run_with(&config)?;
    info!(
        "Ran {} frames, emitted {} particles",
        report.frames, report.emitted_total
    );
    Ok(())
}
