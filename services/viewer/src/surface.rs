//! Map-surface seam.
//!
//! The actual WebGL/map renderer is an external collaborator; the pipeline
//! only ever hands it a declarative layer list. The surface and its renderer
//! handle are owned by the [`crate::session::ViewerSession`] for its whole
//! lifecycle: created on mount, destroyed exactly once on teardown, never
//! reconstructed in between.

use tracing::{debug, info};

use crate::compositor::RenderLayer;

/// Render target for composed layer lists.
pub trait MapSurface: Send {
    /// Replace the currently displayed layers.
    fn submit(&mut self, layers: &[RenderLayer]);

    /// Finalize the surface and its renderer handle. Called once, on
    /// teardown.
    fn destroy(&mut self);
}

/// Surface for headless operation: logs submissions instead of drawing.
#[derive(Debug, Default)]
pub struct LogSurface {
    submissions: u64,
}

impl MapSurface for LogSurface {
    fn submit(&mut self, layers: &[RenderLayer]) {
        self.submissions += 1;
        let feature_count: usize = layers
            .iter()
            .map(|layer| match layer {
                RenderLayer::Icon(icon) => icon.positions.len(),
                RenderLayer::Geometry(geometry) => geometry.collection.len(),
            })
            .sum();
        debug!(
            layers = layers.len(),
            features = feature_count,
            submissions = self.submissions,
            "Layer list submitted"
        );
    }

    fn destroy(&mut self) {
        info!(submissions = self.submissions, "Map surface destroyed");
    }
}
