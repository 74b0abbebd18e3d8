//! Viewer session: lifecycle owner of the map surface and the poll loop.
//!
//! One session is created on mount and torn down exactly once; the surface
//! is never reconstructed mid-lifecycle. Zoom and click events are
//! synchronous and recompose without touching the network.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::info;

use feed_common::{Catalog, DatasetId};

use crate::client::FeedFetcher;
use crate::compositor;
use crate::poller::Poller;
use crate::scene::{SceneSnapshot, SceneState};
use crate::surface::MapSurface;

pub struct ViewerSession {
    scene: Arc<Mutex<SceneState>>,
    surface: Arc<Mutex<Box<dyn MapSurface>>>,
    poller: Poller,
    torn_down: bool,
}

impl ViewerSession {
    pub fn new(
        fetcher: Arc<dyn FeedFetcher>,
        catalog: Arc<Catalog>,
        surface: Box<dyn MapSurface>,
        poll_interval: Duration,
    ) -> Self {
        let scene = Arc::new(Mutex::new(SceneState::new()));
        let surface = Arc::new(Mutex::new(surface));
        let poller = Poller::new(
            fetcher,
            catalog,
            poll_interval,
            scene.clone(),
            surface.clone(),
        );
        Self {
            scene,
            surface,
            poller,
            torn_down: false,
        }
    }

    /// Switch the live dataset; clears selection and data from the previous
    /// one before the first fetch of the new one resolves.
    pub fn activate(&mut self, dataset: DatasetId) {
        self.poller.activate(dataset);
    }

    pub fn deactivate(&mut self) {
        self.poller.deactivate();
    }

    pub fn active_dataset(&self) -> Option<DatasetId> {
        self.poller.active_dataset()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_active()
    }

    /// Viewport zoom changed: recompose synchronously with the existing
    /// data, no refetch.
    pub fn set_zoom(&self, zoom: f64) {
        let layers = {
            let mut scene = self.scene.lock().unwrap();
            scene.zoom = zoom;
            compositor::compose_scene(&scene)
        };
        self.surface.lock().unwrap().submit(&layers);
    }

    /// Click at screen coordinates; `hit` is the surface's hit-test result.
    pub fn handle_click(&self, screen_x: f64, screen_y: f64, hit: Option<usize>) {
        let mut scene = self.scene.lock().unwrap();
        compositor::handle_click(&mut scene, screen_x, screen_y, hit);
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        self.scene.lock().unwrap().snapshot()
    }

    /// Shared scene handle for the status API.
    pub fn scene(&self) -> Arc<Mutex<SceneState>> {
        self.scene.clone()
    }

    /// Cancel polling and destroy the map surface. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.poller.deactivate();
        self.surface.lock().unwrap().destroy();
        info!("Viewer session torn down");
    }
}

impl Drop for ViewerSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
