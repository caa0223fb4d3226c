//! Axum route handlers for the Jobs API.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub total_postings: usize,
    pub titles: Vec<String>,
}

/// GET /api/v1/jobs
///
/// Distinct job titles in corpus order, for the single-job selector.
pub async fn handle_list_jobs(State(state): State<AppState>) -> Json<JobListResponse> {
    Json(JobListResponse {
        total_postings: state.jobs.len(),
        titles: state.jobs.titles().into_iter().map(String::from).collect(),
    })
}
