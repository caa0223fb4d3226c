use std::sync::Arc;

use crate::career::CareerAnalyzer;
use crate::config::Config;
use crate::jobs::JobCorpus;
use crate::matching::scoring::ScoreComposer;
use crate::matching::similarity::SimilarityProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Loaded once at startup, read-only afterwards.
    pub jobs: Arc<JobCorpus>,
    pub analyzer: CareerAnalyzer,
    pub composer: ScoreComposer,
    /// Pluggable similarity backend. Default: LexicalSimilarity. Swap via SIMILARITY_BACKEND.
    pub similarity: Arc<dyn SimilarityProvider>,
}

impl AppState {
    pub fn new(
        config: Config,
        jobs: JobCorpus,
        similarity: Arc<dyn SimilarityProvider>,
    ) -> Self {
        let analyzer = CareerAnalyzer {
            gap_threshold_months: config.gap_threshold_months,
            job_hopping_threshold_months: config.job_hopping_threshold_months,
            risk_policy: config.risk_policy,
        };
        Self {
            config,
            jobs: Arc::new(jobs),
            analyzer,
            composer: ScoreComposer::default(),
            similarity,
        }
    }
}
