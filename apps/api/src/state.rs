use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::Completer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Model access for the analysis pipeline. In production an `LlmGateway`.
    pub llm: Arc<dyn Completer>,
    pub config: Config,
}
