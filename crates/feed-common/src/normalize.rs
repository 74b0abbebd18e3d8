//! Geometry normalization for raw provider payloads.
//!
//! Some providers serialize coordinates as strings (`"4.35"` instead of
//! `4.35`). The normalizer coerces numeric-looking string elements to floats,
//! recursing through nested coordinate arrays, and leaves everything else
//! untouched. Values that cannot be parsed stay non-numeric; out-of-range
//! coordinates are a known upstream data-quality issue and are not corrected
//! here.

use serde_json::Value;

use crate::feature::FeatureCollection;

/// Normalize every feature's coordinates in place.
///
/// Idempotent: normalizing twice yields the same collection as normalizing
/// once. Never drops or reorders features, never errors.
pub fn normalize(mut collection: FeatureCollection) -> FeatureCollection {
    for feature in &mut collection.features {
        coerce_numeric(&mut feature.geometry.coordinates);
    }
    collection
}

/// Recursively replace numeric-looking strings with JSON numbers.
fn coerce_numeric(value: &mut Value) {
    match value {
        Value::Array(items) => {
            for item in items {
                coerce_numeric(item);
            }
        }
        Value::String(s) => {
            if let Ok(parsed) = s.trim().parse::<f64>() {
                if parsed.is_finite() {
                    if let Some(number) = serde_json::Number::from_f64(parsed) {
                        *value = Value::Number(number);
                    }
                }
            }
        }
        _ => {}
    }
}
