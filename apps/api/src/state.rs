use std::sync::Arc;

use crate::config::Config;
use crate::extraction::ResumeExtractor;
use crate::portfolio::PortfolioStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Portfolio documents. Postgres in production.
    pub store: Arc<dyn PortfolioStore>,
    /// Vision extraction with key rotation.
    pub extractor: Arc<ResumeExtractor>,
    pub config: Config,
}
