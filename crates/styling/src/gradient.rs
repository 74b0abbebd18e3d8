//! Gradient color mapping and legend generation for live data layers.

use serde::{Deserialize, Serialize};

/// Color value in RGBA format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// CSS hex string, `#rrggbbaa`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

/// Fixed 4-stop ramp used for every value-driven encoding:
/// green (low) to yellow, orange, red (high).
pub const GRADIENT_STOPS: [Rgba; 4] = [
    Rgba::opaque(0, 255, 0),
    Rgba::opaque(255, 255, 0),
    Rgba::opaque(255, 165, 0),
    Rgba::opaque(255, 0, 0),
];

/// Interpolated color for `value` over `[min, max]`.
///
/// The value is normalized to `t` in `[0, 1]` (clamped), the containing
/// segment is `floor(t * 3)` clamped to the last segment, and the color is a
/// linear blend inside that segment. `t = 0` yields the first stop exactly
/// and `t = 1` the last stop exactly.
pub fn color_at(value: f64, min: f64, max: f64, alpha: Option<u8>) -> Rgba {
    let range = max - min;
    let range = if range.abs() < f64::EPSILON { 1.0 } else { range };
    let t = ((value - min) / range).clamp(0.0, 1.0);

    let segments = (GRADIENT_STOPS.len() - 1) as f64;
    let segment = ((t * segments).floor() as usize).min(GRADIENT_STOPS.len() - 2);
    let local = t * segments - segment as f64;

    let color = interpolate(GRADIENT_STOPS[segment], GRADIENT_STOPS[segment + 1], local);
    match alpha {
        Some(a) => color.with_alpha(a),
        None => color,
    }
}

/// Linear color interpolation.
fn interpolate(low: Rgba, high: Rgba, t: f64) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;
    let blend = |a: u8, b: u8| -> u8 { (a as f64 * t_inv + b as f64 * t).round() as u8 };
    Rgba::new(
        blend(low.r, high.r),
        blend(low.g, high.g),
        blend(low.b, high.b),
        blend(low.a, high.a),
    )
}

/// Legend for one styled layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub title: String,
    pub items: Vec<LegendItem>,
}

/// One legend band: representative color plus value-range label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendItem {
    pub color: Rgba,
    pub label: String,
}

/// Partition `[min, max]` into `steps` equal bands.
///
/// Each band gets the gradient color of its midpoint. Labels use `≤` for the
/// first band, `lo - hi` for middle bands and `>` for the last band, with
/// bounds rounded to integers and an optional unit suffix.
pub fn legend(title: &str, min: f64, max: f64, steps: usize, unit: Option<&str>) -> Legend {
    let steps = steps.max(1);
    let band = (max - min) / steps as f64;
    let suffix = unit.map(|u| format!(" {}", u)).unwrap_or_default();

    let items = (0..steps)
        .map(|i| {
            let lo = min + band * i as f64;
            let hi = lo + band;
            let color = color_at(lo + band / 2.0, min, max, None);
            let label = if i == 0 {
                format!("\u{2264} {}{}", hi.round() as i64, suffix)
            } else if i == steps - 1 {
                format!("> {}{}", lo.round() as i64, suffix)
            } else {
                format!("{} - {}{}", lo.round() as i64, hi.round() as i64, suffix)
            };
            LegendItem { color, label }
        })
        .collect();

    Legend {
        title: title.to_string(),
        items,
    }
}
