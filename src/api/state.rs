use std::sync::Arc;

use crate::orchestrator::QuoteOrchestrator;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<QuoteOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: QuoteOrchestrator) -> Self {
        AppState {
            orchestrator: Arc::new(orchestrator),
        }
    }
}
