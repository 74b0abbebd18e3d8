//! Tests for style resolution and color specs.

use feed_common::{DatasetId, Feature};
use serde_json::json;
use styling::style::{default_style, resolve, ColorSpec, RenderMode, NEUTRAL_GRAY};

fn feature_with_properties(properties: serde_json::Value) -> Feature {
    serde_json::from_value(json!({
        "geometry": {"type": "Point", "coordinates": [4.35, 50.85]},
        "properties": properties
    }))
    .unwrap()
}

// ============================================================================
// resolution tests
// ============================================================================

#[test]
fn test_every_dataset_resolves() {
    for id in DatasetId::all() {
        let _ = resolve(*id);
    }
}

#[test]
fn test_vehicle_feeds_are_icon_mode() {
    assert!(resolve(DatasetId::Stib).is_icon());
    assert!(resolve(DatasetId::Sncb).is_icon());
    assert!(resolve(DatasetId::Opensky).is_icon());
}

#[test]
fn test_sensor_feeds_are_geometry_mode() {
    assert!(!resolve(DatasetId::Telraam).is_icon());
    assert!(!resolve(DatasetId::SensorCommunity).is_icon());
}

#[test]
fn test_default_style_is_neutral_geometry() {
    let style = default_style();
    match style.mode {
        RenderMode::Geometry { fill, radius, .. } => {
            assert_eq!(
                fill,
                ColorSpec::Fixed {
                    color: NEUTRAL_GRAY
                }
            );
            assert!(radius > 0);
        }
        RenderMode::Icon { .. } => panic!("default style must be geometry mode"),
    }
    assert!(style.legend.is_some());
}

#[test]
fn test_geometry_styles_carry_legends() {
    assert!(resolve(DatasetId::Telraam).legend.is_some());
    assert!(resolve(DatasetId::SensorCommunity).legend.is_some());
}

// ============================================================================
// ColorSpec tests
// ============================================================================

#[test]
fn test_fixed_color_ignores_properties() {
    let spec = ColorSpec::Fixed {
        color: NEUTRAL_GRAY,
    };
    let feature = feature_with_properties(json!({"car": 400}));
    assert_eq!(spec.color_for(&feature), NEUTRAL_GRAY);
}

#[test]
fn test_ramp_reads_numeric_property() {
    let spec = ColorSpec::Ramp {
        property: "car".to_string(),
        min: 0.0,
        max: 500.0,
        alpha: 200,
    };
    let low = spec.color_for(&feature_with_properties(json!({"car": 0})));
    let high = spec.color_for(&feature_with_properties(json!({"car": 500})));
    assert_eq!((low.r, low.g, low.b), (0, 255, 0));
    assert_eq!((high.r, high.g, high.b), (255, 0, 0));
    assert_eq!(low.a, 200);
}

#[test]
fn test_ramp_accepts_numeric_looking_strings() {
    let spec = ColorSpec::Ramp {
        property: "pm10".to_string(),
        min: 0.0,
        max: 100.0,
        alpha: 255,
    };
    let from_string = spec.color_for(&feature_with_properties(json!({"pm10": "50"})));
    let from_number = spec.color_for(&feature_with_properties(json!({"pm10": 50})));
    assert_eq!(from_string, from_number);
}

#[test]
fn test_ramp_missing_property_falls_back_to_gray() {
    let spec = ColorSpec::Ramp {
        property: "pm10".to_string(),
        min: 0.0,
        max: 100.0,
        alpha: 255,
    };
    let feature = feature_with_properties(json!({"pm25": 10}));
    assert_eq!(spec.color_for(&feature), NEUTRAL_GRAY);
}
