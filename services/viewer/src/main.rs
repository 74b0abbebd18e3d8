//! Live geodata viewer service.
//!
//! Drives the realtime rendering pipeline headlessly:
//! - Polls the active live feed on a fixed interval
//! - Normalizes wire formats into a canonical feature collection
//! - Resolves per-dataset styles and composes declarative render layers
//! - Exposes a status HTTP API for monitoring

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use feed_common::Catalog;
use viewer::client::HttpFeedClient;
use viewer::server::{self, ServerState};
use viewer::session::ViewerSession;
use viewer::surface::LogSurface;

#[derive(Parser, Debug)]
#[command(name = "viewer")]
#[command(about = "Realtime geodata layer pipeline")]
struct Args {
    /// Dataset key to activate at startup (see /datasets)
    #[arg(short, long, default_value = "stib")]
    dataset: String,

    /// Base URL of the external realtime provider
    #[arg(long, env = "REALTIME_BASE_URL", default_value = "https://api.mobilitytwin.brussels")]
    realtime_base_url: String,

    /// Base URL of the backend component provider
    #[arg(long, env = "BACKEND_BASE_URL", default_value = "http://localhost:8000")]
    backend_base_url: String,

    /// Bearer token for the external realtime provider
    #[arg(long, env = "API_TOKEN")]
    api_token: Option<String>,

    /// Seconds between poll cycles (20 for the full viewer, 10 for the
    /// simple variant)
    #[arg(long, default_value = "20")]
    poll_interval_secs: u64,

    /// Port for the status HTTP server
    #[arg(long, env = "STATUS_PORT", default_value = "8081")]
    status_port: u16,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Disable the status HTTP server
    #[arg(long)]
    no_status_server: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting live geodata viewer");

    let catalog = Arc::new(Catalog::new());
    let descriptor = catalog.resolve(&args.dataset)?.clone();

    let fetcher = Arc::new(HttpFeedClient::new(
        args.realtime_base_url.clone(),
        args.backend_base_url.clone(),
        args.api_token.clone(),
    ));

    let mut session = ViewerSession::new(
        fetcher,
        catalog.clone(),
        Box::new(LogSurface::default()),
        Duration::from_secs(args.poll_interval_secs),
    );

    if !args.no_status_server {
        let server_state = Arc::new(ServerState {
            scene: session.scene(),
            catalog: catalog.clone(),
            poll_interval_secs: args.poll_interval_secs,
        });
        let status_port = args.status_port;
        tokio::spawn(async move {
            if let Err(e) = server::run_server(server_state, status_port).await {
                tracing::error!(error = %e, "Status server failed");
            }
        });
    }

    session.activate(descriptor.id);
    info!(dataset = %descriptor.id, name = %descriptor.name, "Polling live feed");

    tokio::signal::ctrl_c().await.ok();
    info!("Received shutdown signal");

    let snapshot = session.snapshot();
    session.teardown();

    info!(
        dataset = ?snapshot.dataset,
        features = snapshot.feature_count,
        last_tick = ?snapshot.last_tick,
        "Viewer session complete"
    );

    Ok(())
}
