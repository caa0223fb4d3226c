//! Axum route handlers for the Career API.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;

use crate::career::CareerProfile;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeCareerRequest {
    pub resume_text: String,
}

/// POST /api/v1/career/analyze
///
/// Extracts the employment timeline from raw resume text and reports gaps,
/// tenure and the resulting risk level.
pub async fn handle_analyze_career(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeCareerRequest>,
) -> Result<Json<CareerProfile>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }

    let today = Utc::now().date_naive();
    Ok(Json(state.analyzer.analyze(&request.resume_text, today)))
}
