//! Scene state: the single owner of everything the map currently shows.
//!
//! The poll task, zoom handler, click handler and status API all read or
//! write through one `Arc<Mutex<SceneState>>`. The generation counter ties a
//! displayed collection to the dataset activation that fetched it; a poll
//! task whose generation no longer matches must discard its result.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use feed_common::{DatasetId, FeatureCollection};
use styling::StyleDescriptor;

/// Default viewport zoom before the host reports one.
pub const DEFAULT_ZOOM: f64 = 13.0;

/// Picked-feature state backing the tooltip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub screen_x: f64,
    pub screen_y: f64,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Everything the compositor needs to rebuild the layer list.
#[derive(Debug)]
pub struct SceneState {
    /// Bumped on every dataset activation; stale poll results compare against
    /// this under the lock.
    pub generation: u64,
    pub dataset: Option<DatasetId>,
    pub style: Option<Arc<StyleDescriptor>>,
    pub collection: FeatureCollection,
    pub zoom: f64,
    pub selection: Option<Selection>,
    pub last_error: Option<String>,
    pub last_tick: Option<DateTime<Utc>>,
}

impl SceneState {
    pub fn new() -> Self {
        Self {
            generation: 0,
            dataset: None,
            style: None,
            collection: FeatureCollection::empty(),
            zoom: DEFAULT_ZOOM,
            selection: None,
            last_error: None,
            last_tick: None,
        }
    }

    /// Reset for a new dataset activation. Bumps the generation, clears the
    /// previous dataset's data, selection and error, and caches the style for
    /// the activation's lifetime.
    pub fn begin_activation(&mut self, dataset: DatasetId) -> u64 {
        self.generation += 1;
        self.dataset = Some(dataset);
        self.style = Some(Arc::new(styling::resolve(dataset)));
        self.collection = FeatureCollection::empty();
        self.selection = None;
        self.last_error = None;
        self.last_tick = None;
        self.generation
    }

    /// Serializable snapshot for the status API.
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            dataset: self.dataset.map(|d| d.key().to_string()),
            generation: self.generation,
            feature_count: self.collection.len(),
            zoom: self.zoom,
            selection: self.selection.clone(),
            last_error: self.last_error.clone(),
            last_tick: self.last_tick.map(|t| t.to_rfc3339()),
        }
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the scene for the status API.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSnapshot {
    pub dataset: Option<String>,
    pub generation: u64,
    pub feature_count: usize,
    pub zoom: f64,
    pub selection: Option<Selection>,
    pub last_error: Option<String>,
    pub last_tick: Option<String>,
}
