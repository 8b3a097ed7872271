use std::sync::Arc;

use crate::analysis::scorer::ResumeScorer;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable scorer. Default: LlmResumeScorer. Tests inject a fake.
    pub scorer: Arc<dyn ResumeScorer>,
}
