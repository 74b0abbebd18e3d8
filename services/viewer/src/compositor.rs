//! Layer composition: normalized data + style + zoom into the declarative
//! layer list handed to the map surface, plus feature picking.

use serde::Serialize;

use feed_common::FeatureCollection;
use styling::style::{RenderMode, StyleDescriptor};
use styling::{atlas_for, zoom, Rgba};

use crate::scene::{SceneState, Selection};

/// One entry of the declarative layer list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderLayer {
    Icon(IconLayer),
    Geometry(GeometryLayer),
}

/// All point features drawn with one shared glyph texture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IconLayer {
    pub id: String,
    /// PNG data URI from the icon atlas; empty disables the layer visually.
    pub atlas_uri: String,
    /// Zoom-scaled size in pixels.
    pub size_px: u32,
    pub color: Rgba,
    /// Lon/lat/alt per point feature, indexed like `feature_indices`.
    pub positions: Vec<[f64; 3]>,
    /// Index of each position's feature in the source collection, for picking.
    pub feature_indices: Vec<usize>,
}

/// Filled geometry with colors computed per feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryLayer {
    pub id: String,
    pub radius_px: u32,
    /// One fill/line color per feature, in collection order.
    pub fill_colors: Vec<Rgba>,
    pub line_colors: Vec<Rgba>,
    pub collection: FeatureCollection,
}

/// Build the ordered layer list for the current collection, style and zoom.
///
/// Icon mode emits one icon layer over all point features; geometry mode
/// emits one geometry layer applying the descriptor's color specs to the raw
/// collection. Re-invoked whenever the collection or the zoom changes; a
/// zoom-only change never refetches data.
pub fn compose(
    collection: &FeatureCollection,
    style: &StyleDescriptor,
    zoom_level: f64,
) -> Vec<RenderLayer> {
    match &style.mode {
        RenderMode::Icon {
            glyph,
            base_size,
            color,
        } => {
            let mut positions = Vec::new();
            let mut feature_indices = Vec::new();
            for (index, feature) in collection.features.iter().enumerate() {
                if let Some(position) = feature.geometry.position() {
                    positions.push(position);
                    feature_indices.push(index);
                }
            }
            vec![RenderLayer::Icon(IconLayer {
                id: "live-icon".to_string(),
                atlas_uri: atlas_for(glyph),
                size_px: zoom::scale(zoom_level, *base_size),
                color: *color,
                positions,
                feature_indices,
            })]
        }
        RenderMode::Geometry { fill, line, radius } => {
            let fill_colors = collection
                .features
                .iter()
                .map(|f| fill.color_for(f))
                .collect();
            let line_colors = collection
                .features
                .iter()
                .map(|f| line.color_for(f))
                .collect();
            vec![RenderLayer::Geometry(GeometryLayer {
                id: "live-geometry".to_string(),
                radius_px: *radius,
                fill_colors,
                line_colors,
                collection: collection.clone(),
            })]
        }
    }
}

/// Layer list for a whole scene; empty until a style is resolved.
pub fn compose_scene(scene: &SceneState) -> Vec<RenderLayer> {
    match &scene.style {
        Some(style) => compose(&scene.collection, style, scene.zoom),
        None => Vec::new(),
    }
}

/// Apply a click at screen coordinates.
///
/// `hit` is the index of the picked feature as reported by the map surface's
/// hit test, or `None` when the click missed every feature. A hit captures
/// the feature's properties and the screen position for the tooltip; a miss
/// clears the selection.
pub fn handle_click(scene: &mut SceneState, screen_x: f64, screen_y: f64, hit: Option<usize>) {
    scene.selection = hit
        .and_then(|index| scene.collection.features.get(index))
        .map(|feature| Selection {
            screen_x,
            screen_y,
            properties: feature.properties.clone(),
        });
}
