//! Alpha-map atlas.
//!
//! All alpha maps (start maps first, then end maps) are packed into one
//! horizontal strip of square cells. Cell `i` covers `u` in
//! `[i / count, (i + 1) / count)`, so a particle's local `uv` maps to
//! `((i + uv.x) / count, uv.y)`. Only the alpha channel is read.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use flare_common::{FlareError, FlareResult};
use glam::Vec2;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayAlphaImage, RgbaImage};
use tracing::debug;

use crate::config::AlphaMapHandle;

/// Samples the alpha channel of an atlas.
pub trait AlphaSampler: fmt::Debug + Send + Sync {
    /// Alpha in `[0, 1]` at `uv`; `v = 0` is the bottom row.
    fn sample_alpha(&self, uv: Vec2) -> f32;
}

/// Builds an atlas from alpha-map handles.
pub trait AtlasProvider {
    /// Packs `maps` into cells of `cell_size` pixels. Returns `None` when
    /// there is nothing to pack.
    fn atlas(
        &self,
        maps: &[AlphaMapHandle],
        cell_size: u32,
    ) -> FlareResult<Option<Arc<dyn AlphaSampler>>>;
}

fn nearest_texel(width: u32, height: u32, uv: Vec2) -> Option<(u32, u32)> {
    if width == 0 || height == 0 {
        return None;
    }
    let uv = uv.clamp(Vec2::ZERO, Vec2::ONE);
    let x = ((uv.x * width as f32) as u32).min(width - 1);
    let y = (((1.0 - uv.y) * height as f32) as u32).min(height - 1);
    Some((x, y))
}

impl AlphaSampler for GrayAlphaImage {
    fn sample_alpha(&self, uv: Vec2) -> f32 {
        nearest_texel(self.width(), self.height(), uv)
            .map_or(1.0, |(x, y)| f32::from(self.get_pixel(x, y)[1]) / 255.0)
    }
}

impl AlphaSampler for RgbaImage {
    fn sample_alpha(&self, uv: Vec2) -> f32 {
        nearest_texel(self.width(), self.height(), uv)
            .map_or(1.0, |(x, y)| f32::from(self.get_pixel(x, y)[3]) / 255.0)
    }
}

/// Packs images into a horizontal strip of `cell_size` square cells.
#[must_use]
pub fn compose_strip(cells: &[DynamicImage], cell_size: u32) -> GrayAlphaImage {
    let cell_size = cell_size.max(1);
    let mut strip = GrayAlphaImage::new(cell_size * cells.len() as u32, cell_size);
    for (i, cell) in cells.iter().enumerate() {
        let resized = imageops::resize(
            &cell.to_luma_alpha8(),
            cell_size,
            cell_size,
            FilterType::Triangle,
        );
        imageops::replace(&mut strip, &resized, i64::from(cell_size) * i as i64, 0);
    }
    strip
}

/// Loads alpha maps from files under a root directory, keyed by handle.
#[derive(Debug, Clone)]
pub struct DirectoryAtlasProvider {
    root: PathBuf,
}

impl DirectoryAtlasProvider {
    /// Creates a provider resolving handles relative to `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AtlasProvider for DirectoryAtlasProvider {
    fn atlas(
        &self,
        maps: &[AlphaMapHandle],
        cell_size: u32,
    ) -> FlareResult<Option<Arc<dyn AlphaSampler>>> {
        if maps.is_empty() {
            return Ok(None);
        }

        let cells = maps
            .iter()
            .map(|handle| {
                let path = self.root.join(handle.key());
                image::open(&path)
                    .map_err(|e| FlareError::Asset(format!("{}: {e}", path.display())))
            })
            .collect::<FlareResult<Vec<_>>>()?;

        let strip = compose_strip(&cells, cell_size);
        debug!(
            "Packed {} alpha maps into a {}x{} atlas",
            cells.len(),
            strip.width(),
            strip.height()
        );
        Ok(Some(Arc::new(strip)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::LumaA;

    fn solid(alpha: u8) -> DynamicImage {
        DynamicImage::ImageLumaA8(GrayAlphaImage::from_pixel(8, 8, LumaA([255, alpha])))
    }

    #[test]
    fn test_nearest_sampling() {
        let mut image = GrayAlphaImage::from_pixel(2, 2, LumaA([255, 0]));
        // Bottom-left texel
        image.put_pixel(0, 1, LumaA([255, 255]));

        assert_eq!(image.sample_alpha(Vec2::new(0.1, 0.1)), 1.0);
        assert_eq!(image.sample_alpha(Vec2::new(0.9, 0.1)), 0.0);
        assert_eq!(image.sample_alpha(Vec2::new(0.1, 0.9)), 0.0);
        // Out-of-range uv is clamped
        assert_eq!(image.sample_alpha(Vec2::new(-1.0, -1.0)), 1.0);
    }

    #[test]
    fn test_rgba_reads_alpha_channel() {
        let image = RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 0, 51]));
        assert!((image.sample_alpha(Vec2::splat(0.5)) - 0.2).abs() < 1e-6);
        assert_eq!(RgbaImage::new(0, 0).sample_alpha(Vec2::ZERO), 1.0);
    }

    #[test]
    fn test_compose_strip_layout() {
        let strip = compose_strip(&[solid(0), solid(255), solid(128)], 4);
        assert_eq!(strip.dimensions(), (12, 4));

        let cell_alpha = |i: f32| strip.sample_alpha(Vec2::new((i + 0.5) / 3.0, 0.5));
        assert_eq!(cell_alpha(0.0), 0.0);
        assert_eq!(cell_alpha(1.0), 1.0);
        assert!((cell_alpha(2.0) - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_directory_provider() {
        let dir = tempfile::tempdir().expect("temp dir");
        solid(255)
            .save(dir.path().join("a.png"))
            .expect("write png");
        solid(0).save(dir.path().join("b.png")).expect("write png");

        let provider = DirectoryAtlasProvider::new(dir.path());
        assert!(provider.atlas(&[], 16).expect("empty is fine").is_none());

        let maps = [AlphaMapHandle::new("a.png"), AlphaMapHandle::new("b.png")];
        let atlas = provider
            .atlas(&maps, 16)
            .expect("atlas builds")
            .expect("atlas present");
        assert_eq!(atlas.sample_alpha(Vec2::new(0.25, 0.5)), 1.0);
        assert_eq!(atlas.sample_alpha(Vec2::new(0.75, 0.5)), 0.0);

        let missing = provider.atlas(&[AlphaMapHandle::new("missing.png")], 16);
        assert!(matches!(missing, Err(FlareError::Asset(_))));
    }
}
