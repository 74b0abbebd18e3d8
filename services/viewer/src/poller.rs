//! Polling scheduler for the active dataset.
//!
//! One dataset is live at a time. Activation cancels the previous poll
//! handle, bumps the scene generation and spawns a fetch loop; the loop
//! fetches immediately, then repeats on a fixed interval until cancelled.
//! Results are published under the scene lock only when the task's
//! generation still matches the active one, so a fetch started for dataset A
//! can never overwrite dataset B (last request wins).
//!
//! Poll-cycle errors are recorded as display strings and never stop the loop
//! or tear the component down.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use feed_common::{normalize, Catalog, DatasetDescriptor, DatasetId, FeedResult};

use crate::client::FeedFetcher;
use crate::compositor;
use crate::scene::SceneState;
use crate::surface::MapSurface;

/// Default refresh interval for the full-featured viewer.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(20);

/// Cancellation token for one dataset activation. Exactly one is alive at a
/// time; [`Poller::activate`] always cancels the previous handle before
/// creating the next.
struct PollHandle {
    dataset: DatasetId,
    generation: u64,
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    fn cancel(self) {
        let _ = self.cancel.send(true);
        self.task.abort();
    }
}

/// Drives the fetch/refresh loop for the currently active dataset.
pub struct Poller {
    fetcher: Arc<dyn FeedFetcher>,
    catalog: Arc<Catalog>,
    interval: Duration,
    scene: Arc<Mutex<SceneState>>,
    surface: Arc<Mutex<Box<dyn MapSurface>>>,
    active: Option<PollHandle>,
}

impl Poller {
    pub fn new(
        fetcher: Arc<dyn FeedFetcher>,
        catalog: Arc<Catalog>,
        interval: Duration,
        scene: Arc<Mutex<SceneState>>,
        surface: Arc<Mutex<Box<dyn MapSurface>>>,
    ) -> Self {
        Self {
            fetcher,
            catalog,
            interval,
            scene,
            surface,
            active: None,
        }
    }

    /// Switch the live dataset. Cancels the outstanding handle first, then
    /// resets the scene and schedules the new fetch loop.
    pub fn activate(&mut self, dataset: DatasetId) {
        if let Some(previous) = self.active.take() {
            debug!(dataset = %previous.dataset, "Cancelling previous poll handle");
            previous.cancel();
        }

        let descriptor = self.catalog.get(dataset).clone();
        let generation = {
            let mut scene = self.scene.lock().unwrap();
            scene.begin_activation(dataset)
        };

        info!(dataset = %dataset, generation, "Activating dataset");

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let task = tokio::spawn(poll_loop(
            self.fetcher.clone(),
            descriptor,
            generation,
            self.interval,
            self.scene.clone(),
            self.surface.clone(),
            cancel_rx,
        ));

        self.active = Some(PollHandle {
            dataset,
            generation,
            cancel: cancel_tx,
            task,
        });
    }

    /// Stop polling without activating anything else.
    pub fn deactivate(&mut self) {
        if let Some(handle) = self.active.take() {
            info!(dataset = %handle.dataset, "Deactivating dataset");
            handle.cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_dataset(&self) -> Option<DatasetId> {
        self.active.as_ref().map(|handle| handle.dataset)
    }

    pub fn active_generation(&self) -> Option<u64> {
        self.active.as_ref().map(|handle| handle.generation)
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.deactivate();
    }
}

async fn poll_loop(
    fetcher: Arc<dyn FeedFetcher>,
    descriptor: DatasetDescriptor,
    generation: u64,
    interval: Duration,
    scene: Arc<Mutex<SceneState>>,
    surface: Arc<Mutex<Box<dyn MapSurface>>>,
    mut cancel: watch::Receiver<bool>,
) {
    loop {
        let result = tokio::select! {
            _ = cancel.changed() => break,
            result = fetch_once(fetcher.as_ref(), &descriptor) => result,
        };

        publish(&scene, &surface, &descriptor, generation, result);

        tokio::select! {
            _ = cancel.changed() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
    debug!(dataset = %descriptor.id, generation, "Poll loop stopped");
}

async fn fetch_once(
    fetcher: &dyn FeedFetcher,
    descriptor: &DatasetDescriptor,
) -> FeedResult<feed_common::FeatureCollection> {
    fetcher.fetch(descriptor).await.map(normalize)
}

/// Write one poll cycle's outcome into the scene and resubmit layers.
///
/// Holds the scene lock for the generation check and the write together;
/// results from a superseded activation are discarded untouched.
fn publish(
    scene: &Arc<Mutex<SceneState>>,
    surface: &Arc<Mutex<Box<dyn MapSurface>>>,
    descriptor: &DatasetDescriptor,
    generation: u64,
    result: FeedResult<feed_common::FeatureCollection>,
) {
    let layers = {
        let mut scene = scene.lock().unwrap();
        if scene.generation != generation {
            debug!(
                dataset = %descriptor.id,
                stale = generation,
                active = scene.generation,
                "Discarding stale poll result"
            );
            return;
        }

        scene.last_tick = Some(chrono::Utc::now());
        match result {
            Ok(collection) => {
                debug!(dataset = %descriptor.id, features = collection.len(), "Poll cycle complete");
                scene.collection = collection;
                scene.last_error = None;
            }
            Err(error) => {
                warn!(dataset = %descriptor.id, error = %error, "Poll cycle failed");
                scene.last_error = Some(error.user_message());
            }
        }
        compositor::compose_scene(&scene)
    };

    let mut surface = surface.lock().unwrap();
    surface.submit(&layers);
}
