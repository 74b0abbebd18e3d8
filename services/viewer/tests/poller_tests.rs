//! Tests for the polling scheduler, session lifecycle and last-fetch-wins
//! ordering, using a scripted in-memory fetcher.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use feed_common::{
    Catalog, DatasetDescriptor, DatasetId, Feature, FeatureCollection, FeedError, FeedResult,
};
use viewer::client::FeedFetcher;
use viewer::compositor::RenderLayer;
use viewer::session::ViewerSession;
use viewer::surface::MapSurface;

// ============================================================================
// Test doubles
// ============================================================================

/// Fetcher returning a canned response per dataset, with configurable
/// latency and failures. Coordinates are strings so the normalizer is
/// exercised on every publish.
#[derive(Default)]
struct ScriptedFetcher {
    delays: HashMap<&'static str, Duration>,
    failures: HashSet<&'static str>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedFetcher {
    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl FeedFetcher for ScriptedFetcher {
    async fn fetch(&self, descriptor: &DatasetDescriptor) -> FeedResult<FeatureCollection> {
        let key = descriptor.id.key();
        self.calls.lock().unwrap().push(key.to_string());

        if let Some(delay) = self.delays.get(key) {
            tokio::time::sleep(*delay).await;
        }

        if self.failures.contains(key) {
            return Err(FeedError::Fetch {
                dataset: key.to_string(),
                message: "HTTP 503".to_string(),
            });
        }

        let feature: Feature = serde_json::from_value(json!({
            "geometry": {"type": "Point", "coordinates": ["4.35", "50.85"]},
            "properties": {"source": key}
        }))
        .unwrap();
        Ok(FeatureCollection::new(vec![feature]))
    }
}

/// Surface recording every submitted layer list and its destruction.
#[derive(Default)]
struct RecordingSurface {
    submissions: Arc<Mutex<Vec<Vec<RenderLayer>>>>,
    destroyed: Arc<AtomicBool>,
}

impl MapSurface for RecordingSurface {
    fn submit(&mut self, layers: &[RenderLayer]) {
        self.submissions.lock().unwrap().push(layers.to_vec());
    }

    fn destroy(&mut self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }
}

fn session_with(
    fetcher: Arc<ScriptedFetcher>,
    surface: RecordingSurface,
    interval: Duration,
) -> ViewerSession {
    ViewerSession::new(fetcher, Arc::new(Catalog::new()), Box::new(surface), interval)
}

fn displayed_source(session: &ViewerSession) -> Option<String> {
    let scene = session.scene();
    let scene = scene.lock().unwrap();
    scene
        .collection
        .features
        .first()
        .and_then(|f| f.properties.get("source"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

// ============================================================================
// Poll loop tests
// ============================================================================

#[tokio::test]
async fn test_first_fetch_populates_scene_with_normalized_coordinates() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let mut session = session_with(
        fetcher.clone(),
        RecordingSurface::default(),
        Duration::from_secs(20),
    );

    session.activate(DatasetId::Stib);
    tokio::time::sleep(Duration::from_millis(80)).await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.dataset.as_deref(), Some("stib"));
    assert_eq!(snapshot.feature_count, 1);
    assert!(snapshot.last_error.is_none());
    assert!(snapshot.last_tick.is_some());

    // String coordinates from the wire must be floats in the scene
    let scene = session.scene();
    let scene = scene.lock().unwrap();
    assert_eq!(
        scene.collection.features[0].geometry.position(),
        Some([4.35, 50.85, 0.0])
    );
}

#[tokio::test]
async fn test_switch_leaves_exactly_one_live_handle() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let mut session = session_with(
        fetcher.clone(),
        RecordingSurface::default(),
        Duration::from_secs(20),
    );

    session.activate(DatasetId::Stib);
    session.activate(DatasetId::Sncb);

    assert!(session.is_polling());
    assert_eq!(session.active_dataset(), Some(DatasetId::Sncb));
    // Two activations, two generations
    assert_eq!(session.snapshot().generation, 2);

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(displayed_source(&session), Some("sncb".to_string()));
}

#[tokio::test]
async fn test_rapid_switches_last_fetch_wins() {
    // The first dataset answers slowly; its response lands after the switch
    // and must be discarded.
    let mut fetcher = ScriptedFetcher::default();
    fetcher.delays.insert("stib", Duration::from_millis(120));
    fetcher.delays.insert("sncb", Duration::from_millis(20));
    let fetcher = Arc::new(fetcher);

    let mut session = session_with(
        fetcher.clone(),
        RecordingSurface::default(),
        Duration::from_secs(20),
    );

    session.activate(DatasetId::Stib);
    tokio::time::sleep(Duration::from_millis(5)).await;
    session.activate(DatasetId::Sncb);

    // Wait past both responses
    tokio::time::sleep(Duration::from_millis(250)).await;

    assert_eq!(session.active_dataset(), Some(DatasetId::Sncb));
    assert_eq!(session.snapshot().dataset.as_deref(), Some("sncb"));
    assert_eq!(displayed_source(&session), Some("sncb".to_string()));
}

#[tokio::test]
async fn test_fetch_error_is_recorded_and_polling_continues() {
    let mut fetcher = ScriptedFetcher::default();
    fetcher.failures.insert("stib");
    let fetcher = Arc::new(fetcher);

    let mut session = session_with(
        fetcher.clone(),
        RecordingSurface::default(),
        Duration::from_millis(25),
    );

    session.activate(DatasetId::Stib);
    tokio::time::sleep(Duration::from_millis(140)).await;

    // Several cycles despite every one failing
    assert!(fetcher.call_count() >= 3, "poll loop stopped after an error");
    assert!(session.is_polling());

    let snapshot = session.snapshot();
    assert_eq!(snapshot.feature_count, 0);
    let error = snapshot.last_error.expect("error should be recorded");
    assert!(error.contains("stib"));
}

#[tokio::test]
async fn test_deactivate_stops_the_loop() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let mut session = session_with(
        fetcher.clone(),
        RecordingSurface::default(),
        Duration::from_millis(25),
    );

    session.activate(DatasetId::Telraam);
    tokio::time::sleep(Duration::from_millis(60)).await;
    session.deactivate();
    assert!(!session.is_polling());

    let calls_after_deactivate = fetcher.call_count();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(fetcher.call_count(), calls_after_deactivate);
}

// ============================================================================
// Session lifecycle tests
// ============================================================================

#[tokio::test]
async fn test_zoom_change_resubmits_without_refetch() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let surface = RecordingSurface::default();
    let submissions = surface.submissions.clone();

    let mut session = session_with(fetcher.clone(), surface, Duration::from_secs(60));
    session.activate(DatasetId::Stib);
    tokio::time::sleep(Duration::from_millis(80)).await;

    let calls_before = fetcher.call_count();
    let submissions_before = submissions.lock().unwrap().len();

    session.set_zoom(16.0);

    assert_eq!(submissions.lock().unwrap().len(), submissions_before + 1);
    assert_eq!(fetcher.call_count(), calls_before);

    // The resubmitted icon layer reflects the new zoom
    let latest = submissions.lock().unwrap().last().unwrap().clone();
    match &latest[0] {
        RenderLayer::Icon(icon) => assert_eq!(icon.size_px, styling::zoom::scale(16.0, 40)),
        other => panic!("expected icon layer, got {:?}", other),
    }
}

#[tokio::test]
async fn test_selection_clears_on_dataset_switch() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let mut session = session_with(
        fetcher.clone(),
        RecordingSurface::default(),
        Duration::from_secs(20),
    );

    session.activate(DatasetId::Stib);
    tokio::time::sleep(Duration::from_millis(80)).await;

    session.handle_click(100.0, 50.0, Some(0));
    assert!(session.snapshot().selection.is_some());

    session.activate(DatasetId::Sncb);
    assert!(session.snapshot().selection.is_none());
}

#[tokio::test]
async fn test_teardown_destroys_surface_and_is_idempotent() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let surface = RecordingSurface::default();
    let destroyed = surface.destroyed.clone();

    let mut session = session_with(fetcher.clone(), surface, Duration::from_millis(25));
    session.activate(DatasetId::Opensky);
    tokio::time::sleep(Duration::from_millis(40)).await;

    session.teardown();
    assert!(destroyed.load(Ordering::SeqCst));
    assert!(!session.is_polling());

    let calls_after = fetcher.call_count();
    session.teardown();
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(fetcher.call_count(), calls_after);
}
