//! Color stops and CSS-style color parsing.
//!
//! Gradient rows are authored as `(color, stop)` pairs where `color` is a CSS
//! color string. Supported forms:
//! - `#rgb`, `#rrggbb` (an alpha suffix `#rgba`/`#rrggbbaa` is accepted and ignored)
//! - `rgb(r, g, b)` with 0-255 components
//! - a small set of named colors

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A single gradient stop as authored in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// CSS color string
    pub color: String,
    /// Position in the gradient, 0 to 1
    pub stop: f32,
}

impl ColorStop {
    /// Creates a color stop.
    #[must_use]
    pub fn new(color: impl Into<String>, stop: f32) -> Self {
        Self {
            color: color.into(),
            stop,
        }
    }
}

/// A color stop with its color resolved to linear RGB components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedStop {
    /// RGB components, 0 to 1
    pub rgb: Vec3,
    /// Position in the gradient, clamped to 0..=1
    pub stop: f32,
}

const NAMED: &[(&str, [u8; 3])] = &[
    ("white", [255, 255, 255]),
    ("black", [0, 0, 0]),
    ("red", [255, 0, 0]),
    ("lime", [0, 255, 0]),
    ("green", [0, 128, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("orange", [255, 165, 0]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("purple", [128, 0, 128]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
];

/// Parses a CSS color string into RGB components in 0..=1.
pub fn parse_color(input: &str) -> Result<Vec3, ConfigError> {
    let s = input.trim();
    let invalid = || ConfigError::InvalidColor(input.to_string());

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(invalid);
    }

    let lower = s.to_ascii_lowercase();
    if let Some(body) = lower
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(invalid());
        }
        let mut rgb = [0u8; 3];
        for (slot, part) in rgb.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| invalid())?;
        }
        return Ok(from_bytes(rgb));
    }

    NAMED
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, rgb)| from_bytes(*rgb))
        .ok_or_else(invalid)
}

/// Resolves a row of authored stops, sorted by position.
///
/// The row is padded so that it covers the full 0..=1 range: if the first
/// stop starts after 0 its color is repeated at 0, and likewise for the last
/// stop and 1.
pub fn resolve_row(row: &[ColorStop], index: usize) -> Result<Vec<ResolvedStop>, ConfigError> {
    if row.is_empty() {
        return Err(ConfigError::EmptyGradientRow(index));
    }

    let mut stops = row
        .iter()
        .map(|s| {
            Ok(ResolvedStop {
                rgb: parse_color(&s.color)?,
                stop: s.stop.clamp(0.0, 1.0),
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;
    stops.sort_by(|a, b| a.stop.total_cmp(&b.stop));

    let first = stops[0];
    if first.stop > 0.0 {
        stops.insert(0, ResolvedStop { stop: 0.0, ..first });
    }
    let last = stops[stops.len() - 1];
    if last.stop < 1.0 {
        stops.push(ResolvedStop { stop: 1.0, ..last });
    }

    Ok(stops)
}

fn parse_hex(hex: &str) -> Option<Vec3> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 | 4 => Some(from_bytes([nibble(0)?, nibble(1)?, nibble(2)?])),
        6 | 8 => Some(from_bytes([byte(0)?, byte(2)?, byte(4)?])),
        _ => None,
    }
}

fn from_bytes(rgb: [u8; 3]) -> Vec3 {
    Vec3::new(
        f32::from(rgb[0]) / 255.0,
        f32::from(rgb[1]) / 255.0,
        f32::from(rgb[2]) / 255.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_color("#ffffff"), Ok(Vec3::ONE));
        assert_eq!(parse_color("#000"), Ok(Vec3::ZERO));
        assert_eq!(parse_color("#f00"), Ok(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(parse_color("#00ff00cc"), Ok(Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_parse_rgb_and_named() {
        assert_eq!(parse_color("rgb(255, 0, 255)"), Ok(Vec3::new(1.0, 0.0, 1.0)));
        assert_eq!(parse_color("White"), Ok(Vec3::ONE));
        assert!(parse_color("not-a-color").is_err());
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("rgb(1,2)").is_err());
    }

    #[test]
    fn test_resolve_row_pads_and_sorts() {
        let row = vec![ColorStop::new("#0000ff", 0.75), ColorStop::new("#ff0000", 0.25)];
        let stops = resolve_row(&row, 0).expect("row should resolve");

        assert_eq!(stops.len(), 4);
        assert_eq!(stops[0].stop, 0.0);
        assert_eq!(stops[0].rgb, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(stops[3].stop, 1.0);
        assert_eq!(stops[3].rgb, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_resolve_empty_row() {
        assert_eq!(resolve_row(&[], 3), Err(ConfigError::EmptyGradientRow(3)));
    }

    proptest::proptest! {
        #[test]
        fn prop_hex_components_in_unit_range(r: u8, g: u8, b: u8) {
            let rgb = parse_color(&format!("#{r:02x}{g:02x}{b:02x}")).expect("valid hex");
            proptest::prop_assert!(rgb.min_element() >= 0.0 && rgb.max_element() <= 1.0);
            proptest::prop_assert_eq!(rgb.x, f32::from(r) / 255.0);
        }
    }
}
