//! # Flare Tools
//!
//! Development tools for Flare emitters.
//!
//! This crate provides:
//! - Editor export loading and emitter resolution
//! - Instance pool inspector
//! - Frame cost tracking

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod export;
pub mod inspector;
pub mod perf;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::export::*;
    pub use crate::inspector::*;
    pub use crate::perf::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use flare_kernel::{AlphaMapHandle, Simulation};

    const EXPORT: &str = r#"[{
        "id": "demo",
        "configs": [{
            "id": "sparks",
            "particles": { "count": 20, "alphaMapsStart": ["dot.png"] },
            "emitter": { "rate": 20, "duration": 2, "lifetime": [1, 1] },
            "position": [0, 1, 0]
        }]
    }]"#;

    #[test]
    fn test_resolved_export_drives_simulation() {
        let doc = ExportDocument::from_json(EXPORT).expect("valid export");
        let resolved = resolve_with(&doc, "demo", "sparks", |path| {
            AlphaMapHandle::new(path.to_owned())
        })
        .expect("emitter exists");
        assert_eq!(resolved.config.particles.alpha_map_count(), 1);

        let mut sim = Simulation::configure_seeded(resolved.config, 4).expect("valid config");
        if let Some(position) = resolved.position {
            sim.set_transform(glam::Affine3A::from_translation(position));
        }
        sim.start();

        let mut tracker = PerfTracker::new(60);
        for _ in 0..2 {
            tracker.measure(|| sim.update(0.25));
        }

        let summary = PoolInspector::new().refresh(&sim);
        let stats = tracker.stats(&summary, sim.emitted_total());
        assert_eq!(stats.emitted_total, 5);
        assert_eq!(stats.live_instances, 5);
        assert_eq!(tracker.frame_count(), 2);
    }
}
