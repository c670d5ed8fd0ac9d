//! Gradient lookup.
//!
//! Particle color comes from a gradient row sampled at the eased progress.
//! The renderer usually bakes the rows into a lookup texture; [`LinearGradient`]
//! is the CPU equivalent and can bake that texture itself.

use std::fmt;
use std::sync::Arc;

use flare_common::{resolve_row, ColorStop, ConfigError, ResolvedStop};
use glam::Vec3;
use image::{Rgba, RgbaImage};

/// Samples gradient rows.
pub trait GradientSampler: fmt::Debug + Send + Sync {
    /// Number of rows.
    fn rows(&self) -> usize;

    /// RGB color of `row` at `u` in `[0, 1]`.
    fn sample(&self, row: usize, u: f32) -> Vec3;
}

/// Builds a gradient sampler from authored rows.
pub trait GradientProvider {
    /// Builds the sampler, validating every color.
    fn gradient(&self, rows: &[Vec<ColorStop>]) -> Result<Arc<dyn GradientSampler>, ConfigError>;
}

/// Piecewise-linear gradient rows.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    rows: Vec<Vec<ResolvedStop>>,
}

impl LinearGradient {
    /// Resolves authored rows. An empty row list becomes a single white row.
    pub fn from_rows(rows: &[Vec<ColorStop>]) -> Result<Self, ConfigError> {
        if rows.is_empty() {
            return Self::from_rows(&[vec![ColorStop::new("white", 0.0)]]);
        }
        let rows = rows
            .iter()
            .enumerate()
            .map(|(index, row)| resolve_row(row, index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    /// Bakes the rows into a `width` x `rows` lookup texture.
    #[must_use]
    pub fn bake(&self, width: u32) -> RgbaImage {
        let width = width.max(1);
        RgbaImage::from_fn(width, self.rows.len() as u32, |x, y| {
            let u = (x as f32 + 0.5) / width as f32;
            let rgb = self.sample(y as usize, u);
            let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
            Rgba([channel(rgb.x), channel(rgb.y), channel(rgb.z), 255])
        })
    }
}

impl GradientSampler for LinearGradient {
    fn rows(&self) -> usize {
        self.rows.len()
    }

    fn sample(&self, row: usize, u: f32) -> Vec3 {
        let Some(stops) = self.rows.get(row.min(self.rows.len().saturating_sub(1))) else {
            return Vec3::ONE;
        };
        let Some((first, rest)) = stops.split_first() else {
            return Vec3::ONE;
        };

        let u = if u.is_nan() { 0.0 } else { u.clamp(0.0, 1.0) };
        let mut prev = first;
        for next in rest {
            if u <= next.stop {
                let span = next.stop - prev.stop;
                if span <= 0.0 {
                    return next.rgb;
                }
                return prev.rgb.lerp(next.rgb, (u - prev.stop) / span);
            }
            prev = next;
        }
        prev.rgb
    }
}

/// Provides [`LinearGradient`] samplers.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearGradientProvider;

impl GradientProvider for LinearGradientProvider {
    fn gradient(&self, rows: &[Vec<ColorStop>]) -> Result<Arc<dyn GradientSampler>, ConfigError> {
        Ok(Arc::new(LinearGradient::from_rows(rows)?))
    }
}
