//! Per-dataset style descriptors.
//!
//! Each dataset resolves to exactly one descriptor: icon mode (all point
//! features share a rasterized glyph) or geometry mode (fill/line colors are
//! computed per feature). Resolution is an exhaustive match over the closed
//! [`DatasetId`] enum, with a documented neutral default for identifiers that
//! carry no bespoke entry.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use feed_common::{DatasetId, Feature};

use crate::gradient::{color_at, legend, Legend, Rgba};

/// Neutral fill used when a feature carries no usable ramp value.
pub const NEUTRAL_GRAY: Rgba = Rgba::new(128, 128, 128, 180);

/// How a color is produced for a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColorSpec {
    /// Same color for every feature.
    Fixed { color: Rgba },

    /// Gradient ramp driven by a numeric feature property.
    Ramp {
        property: String,
        min: f64,
        max: f64,
        alpha: u8,
    },
}

impl ColorSpec {
    /// Concrete color for one feature.
    ///
    /// Ramp specs read the driving property (numeric-looking strings are
    /// accepted, matching the normalizer's tolerance) and fall back to
    /// neutral gray when it is missing or non-numeric.
    pub fn color_for(&self, feature: &Feature) -> Rgba {
        match self {
            ColorSpec::Fixed { color } => *color,
            ColorSpec::Ramp {
                property,
                min,
                max,
                alpha,
            } => match property_value(feature, property) {
                Some(value) => color_at(value, *min, *max, Some(*alpha)),
                None => NEUTRAL_GRAY,
            },
        }
    }
}

fn property_value(feature: &Feature, property: &str) -> Option<f64> {
    match feature.properties.get(property)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Rendering mode for a dataset's layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RenderMode {
    /// One glyph texture shared by all point features.
    Icon {
        glyph: String,
        base_size: u32,
        color: Rgba,
    },

    /// Filled geometry with per-feature colors.
    Geometry {
        fill: ColorSpec,
        line: ColorSpec,
        radius: u32,
    },
}

/// The visual-encoding rules for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDescriptor {
    pub mode: RenderMode,
    pub legend: Option<Legend>,
}

impl StyleDescriptor {
    pub fn is_icon(&self) -> bool {
        matches!(self.mode, RenderMode::Icon { .. })
    }
}

/// Resolve the style for a dataset. Never fails: every identifier either has
/// a bespoke entry below or falls back to [`default_style`].
pub fn resolve(id: DatasetId) -> StyleDescriptor {
    bespoke(id).unwrap_or_else(default_style)
}

/// Documented default: geometry mode, neutral gray fill, radius-based circle,
/// generic legend. Used by any dataset without a bespoke entry and directly
/// by callers that style ad hoc data.
pub fn default_style() -> StyleDescriptor {
    StyleDescriptor {
        mode: RenderMode::Geometry {
            fill: ColorSpec::Fixed {
                color: NEUTRAL_GRAY,
            },
            line: ColorSpec::Fixed {
                color: Rgba::opaque(96, 96, 96),
            },
            radius: 6,
        },
        legend: Some(legend("Values", 0.0, 100.0, 4, None)),
    }
}

/// Bespoke style table over the closed dataset enumeration. The exhaustive
/// match keeps the table honest when a new dataset id is added.
fn bespoke(id: DatasetId) -> Option<StyleDescriptor> {
    match id {
        DatasetId::Stib => Some(StyleDescriptor {
            mode: RenderMode::Icon {
                glyph: "B".to_string(),
                base_size: 40,
                color: Rgba::opaque(0, 120, 215),
            },
            legend: None,
        }),
        DatasetId::Sncb => Some(StyleDescriptor {
            mode: RenderMode::Icon {
                glyph: "T".to_string(),
                base_size: 40,
                color: Rgba::opaque(0, 160, 90),
            },
            legend: None,
        }),
        DatasetId::Telraam => Some(StyleDescriptor {
            mode: RenderMode::Geometry {
                fill: ColorSpec::Ramp {
                    property: "car".to_string(),
                    min: 0.0,
                    max: 500.0,
                    alpha: 160,
                },
                line: ColorSpec::Ramp {
                    property: "car".to_string(),
                    min: 0.0,
                    max: 500.0,
                    alpha: 255,
                },
                radius: 6,
            },
            legend: Some(legend("Traffic", 0.0, 500.0, 4, Some("veh/h"))),
        }),
        DatasetId::SensorCommunity => Some(StyleDescriptor {
            mode: RenderMode::Geometry {
                fill: ColorSpec::Ramp {
                    property: "pm10".to_string(),
                    min: 0.0,
                    max: 100.0,
                    alpha: 180,
                },
                line: ColorSpec::Fixed {
                    color: Rgba::opaque(64, 64, 64),
                },
                radius: 8,
            },
            legend: Some(legend(
                "Air quality (PM10)",
                0.0,
                100.0,
                5,
                Some("\u{b5}g/m\u{b3}"),
            )),
        }),
        DatasetId::Opensky => Some(StyleDescriptor {
            mode: RenderMode::Icon {
                glyph: "\u{2708}".to_string(),
                base_size: 48,
                color: Rgba::opaque(240, 240, 240),
            },
            legend: None,
        }),
    }
}
