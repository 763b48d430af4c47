use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::store::JobStore;
use crate::tracker::Tracker;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: JobStore,
    pub tracker: Arc<Mutex<Tracker>>,
    /// Pluggable text backend. `LlmClient` when an API key is configured,
    /// `UnconfiguredGenerator` otherwise.
    pub generator: Arc<dyn TextGenerator>,
}
