mod config;
mod errors;
mod filter;
mod generation;
mod ingest;
mod llm_client;
mod models;
mod normalize;
mod routes;
mod state;
mod store;
mod tracker;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{LlmClient, TextGenerator, UnconfiguredGenerator};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::JobStore;
use crate::tracker::{LogListener, Tracker};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobboard API v{}", env!("CARGO_PKG_VERSION"));

    let store = JobStore::new(&config.jobs_file);
    info!("Serving job collection from {}", store.path().display());
    info!("{} raw source(s) configured for ingest", config.sources.len());

    let mut tracker = Tracker::open(&config.tracker_file)?;
    tracker.subscribe(Arc::new(LogListener));
    info!("Tracker state loaded from {}", tracker.path().display());

    let generator: Arc<dyn TextGenerator> = match &config.anthropic_api_key {
        Some(key) => {
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Arc::new(LlmClient::new(key.clone())?)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; AI endpoints will report failure");
            Arc::new(UnconfiguredGenerator)
        }
    };

    let state = AppState {
        config: config.clone(),
        store,
        tracker: Arc::new(Mutex::new(tracker)),
        generator,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
