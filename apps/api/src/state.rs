use std::sync::Arc;

use crate::config::Config;
use crate::matching::sections::SectionSplitter;
use crate::matching::similarity::SimilarityScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Section heuristic. Default: KeywordSectionSplitter.
    pub splitter: Arc<dyn SectionSplitter>,
    /// Pluggable similarity backend. Default: EmbeddingScorer, loaded once at startup.
    pub scorer: Arc<dyn SimilarityScorer>,
}
