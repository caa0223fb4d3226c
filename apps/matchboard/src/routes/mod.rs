pub mod dashboard;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::career::handlers as career;
use crate::jobs::handlers as jobs;
use crate::matching::handlers as matching;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes();

    Router::new()
        .route("/", get(dashboard::dashboard_handler))
        .route("/health", get(health::health_handler))
        .route("/api/v1/jobs", get(jobs::handle_list_jobs))
        .route("/api/v1/career/analyze", post(career::handle_analyze_career))
        .route("/api/v1/score", post(matching::handle_score))
        .route("/api/v1/match", post(matching::handle_match))
        .route("/api/v1/match/export", post(matching::handle_match_export))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
