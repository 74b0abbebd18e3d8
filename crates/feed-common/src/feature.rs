//! GeoJSON-like feature model and wire-format decoding.
//!
//! Live providers return one of three envelope shapes for the same payload:
//! a bare feature array, a proper FeatureCollection, or a vendor envelope
//! carrying `{status_code, message, features}`. [`decode_payload`] tries each
//! shape in that fixed order and fails with `MalformedResponse` when none
//! match, instead of probing optional fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FeedError, FeedResult};

/// A single geometry + attribute record (one vehicle, one sensor, one point).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,

    pub geometry: Geometry,
}

/// Feature geometry. Coordinates stay as raw JSON until normalization so that
/// providers sending `"4.35"` instead of `4.35` can be repaired in one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub geometry_type: String,

    pub coordinates: Value,
}

impl Geometry {
    /// Lon/lat(/alt) of a point geometry, if all elements are numeric.
    pub fn position(&self) -> Option<[f64; 3]> {
        if self.geometry_type != "Point" {
            return None;
        }
        let coords = self.coordinates.as_array()?;
        if coords.len() < 2 {
            return None;
        }
        let lon = coords[0].as_f64()?;
        let lat = coords[1].as_f64()?;
        let alt = coords.get(2).and_then(Value::as_f64).unwrap_or(0.0);
        Some([lon, lat, alt])
    }
}

/// An ordered batch of features returned by one poll cycle.
///
/// Produced fresh on every tick; the previous collection is discarded, never
/// mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "collection_tag")]
    pub collection_type: String,

    #[serde(default)]
    pub features: Vec<Feature>,
}

fn collection_tag() -> String {
    "FeatureCollection".to_string()
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            collection_type: collection_tag(),
            features,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::empty()
    }
}

/// Vendor envelope wrapping a feature array with request metadata.
#[derive(Debug, Deserialize)]
struct VendorEnvelope {
    #[allow(dead_code)]
    status_code: i64,
    #[allow(dead_code)]
    #[serde(default)]
    message: String,
    features: Vec<Feature>,
}

/// Decode a raw response body into a canonical [`FeatureCollection`].
///
/// Shapes are attempted in order:
/// 1. bare array of features,
/// 2. FeatureCollection (requires `"type": "FeatureCollection"`),
/// 3. vendor envelope `{status_code, message, features}`.
pub fn decode_payload(dataset: &str, value: Value) -> FeedResult<FeatureCollection> {
    let malformed = |message: String| FeedError::MalformedResponse {
        dataset: dataset.to_string(),
        message,
    };

    if value.is_array() {
        let features: Vec<Feature> = serde_json::from_value(value)
            .map_err(|e| malformed(format!("bad feature array: {}", e)))?;
        return Ok(FeatureCollection::new(features));
    }

    let tag = value.get("type").and_then(Value::as_str);
    if tag == Some("FeatureCollection") {
        return serde_json::from_value(value)
            .map_err(|e| malformed(format!("bad FeatureCollection: {}", e)));
    }

    if value.get("status_code").is_some() {
        let envelope: VendorEnvelope = serde_json::from_value(value)
            .map_err(|e| malformed(format!("bad vendor envelope: {}", e)))?;
        return Ok(FeatureCollection::new(envelope.features));
    }

    Err(malformed("unrecognized response shape".to_string()))
}
