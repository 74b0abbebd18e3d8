//! HTTP server for viewer status and catalog introspection.
//!
//! Read-only observability of the poll loop:
//! - `/status`: active dataset, generation, feature count, last tick/error
//! - `/datasets`: the source catalog
//! - `/healthz`: liveness

use std::sync::{Arc, Mutex};

use axum::{
    extract::Extension,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use feed_common::{Catalog, DatasetDescriptor};
use styling::Legend;

use crate::scene::{SceneSnapshot, SceneState};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub service: String,
    pub poll_interval_secs: u64,
    #[serde(flatten)]
    pub scene: SceneSnapshot,
    pub legend: Option<Legend>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetListResponse {
    pub datasets: Vec<DatasetDescriptor>,
}

// ============================================================================
// Shared State
// ============================================================================

pub struct ServerState {
    pub scene: Arc<Mutex<SceneState>>,
    pub catalog: Arc<Catalog>,
    pub poll_interval_secs: u64,
}

// ============================================================================
// Router
// ============================================================================

/// Create the status API router.
pub fn create_router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/status", get(status_handler))
        .route("/datasets", get(datasets_handler))
        .route("/healthz", get(health_handler))
        .layer(cors)
        .layer(Extension(state))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /status - current scene and poll-loop state
async fn status_handler(Extension(state): Extension<Arc<ServerState>>) -> impl IntoResponse {
    let (snapshot, legend) = {
        let scene = state.scene.lock().unwrap();
        let legend = scene.style.as_ref().and_then(|s| s.legend.clone());
        (scene.snapshot(), legend)
    };

    Json(StatusResponse {
        service: "viewer".to_string(),
        poll_interval_secs: state.poll_interval_secs,
        scene: snapshot,
        legend,
    })
}

/// GET /datasets - the static source catalog
async fn datasets_handler(Extension(state): Extension<Arc<ServerState>>) -> impl IntoResponse {
    Json(DatasetListResponse {
        datasets: state.catalog.datasets().to_vec(),
    })
}

/// GET /healthz - liveness check
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Run the status server until the process exits.
pub async fn run_server(state: Arc<ServerState>, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);
    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting status server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
