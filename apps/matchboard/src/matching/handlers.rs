//! Axum route handlers for the Matching API.

use std::collections::HashMap;

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::jobs::JobField;
use crate::matching::export::{write_ranked_csv, EXPORT_FILE_NAME};
use crate::matching::ranking::{
    BatchRunner, CandidateUpload, MatchBatch, MatchOptions, MatchScope, MatchingMode,
};
use crate::matching::scoring::MatchResult;
use crate::resume::{candidate_name, extract_text_blocking};
use crate::state::AppState;

/// Multipart field carrying resume files. May repeat.
pub const RESUMES_FIELD: &str = "resumes";

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub resume_text: String,
    pub job_text: String,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
}

/// A parsed `/match` form: extracted uploads plus the run options.
#[derive(Debug)]
pub struct MatchForm {
    pub uploads: Vec<CandidateUpload>,
    pub options: MatchOptions,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/score
///
/// Scores one resume text against one job text. `skills`, when given, drives
/// the skill sub-score one skill at a time.
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<MatchResult>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }
    if request.job_text.trim().is_empty() {
        return Err(AppError::Validation("job_text cannot be empty".to_string()));
    }

    let skills = request.skills.unwrap_or_default();
    let result = state
        .composer
        .compose(
            state.similarity.as_ref(),
            &request.resume_text,
            &request.job_text,
            &skills,
        )
        .await?;

    Ok(Json(result))
}

/// POST /api/v1/match
///
/// Multipart upload of one or more resumes. Returns the ranked batch with its
/// summary and any candidates that could not be scored.
pub async fn handle_match(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<MatchBatch>, AppError> {
    let form = read_match_form(multipart).await?;
    Ok(Json(run_batch(&state, form).await?))
}

/// POST /api/v1/match/export
///
/// Same form as `/match`; responds with the ranked rows as a CSV attachment.
pub async fn handle_match_export(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_match_form(multipart).await?;
    let batch = run_batch(&state, form).await?;

    let csv = write_ranked_csv(&batch.results).map_err(|e| AppError::Internal(e.into()))?;
    info!(run_id = %batch.run_id, "Exported {} ranked rows", batch.results.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        csv,
    )
        .into_response())
}

async fn run_batch(state: &AppState, form: MatchForm) -> Result<MatchBatch, AppError> {
    let runner = BatchRunner {
        jobs: &state.jobs,
        analyzer: &state.analyzer,
        composer: &state.composer,
        similarity: state.similarity.as_ref(),
    };
    runner
        .run(form.uploads, &form.options, Utc::now().date_naive())
        .await
}

// ────────────────────────────────────────────────────────────────────────────
// Form parsing
// ────────────────────────────────────────────────────────────────────────────

/// Reads every field. Files under `resumes` are extracted as they arrive;
/// any other field is treated as a text option.
async fn read_match_form(mut multipart: Multipart) -> Result<MatchForm, AppError> {
    let mut uploads = Vec::new();
    let mut fields = HashMap::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == RESUMES_FIELD {
            let file_name = field.file_name().unwrap_or("resume.txt").to_string();
            let data = field.bytes().await?;
            let candidate = candidate_name(&file_name);
            let text = extract_text_blocking(file_name, data).await;
            uploads.push(CandidateUpload { candidate, text });
        } else {
            let value = field.text().await?;
            fields.insert(name, value);
        }
    }

    let options = parse_options(&fields)?;
    Ok(MatchForm { uploads, options })
}

/// Builds run options from the text fields of the form.
///
/// `scope` defaults to `single_job` when a `job_title` is present and to
/// `best_job` otherwise. `mode=field` requires `field`.
pub fn parse_options(fields: &HashMap<String, String>) -> Result<MatchOptions, AppError> {
    let get = |key: &str| {
        fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    };

    let job_title = get("job_title");
    let scope = match (get("scope"), job_title) {
        (Some("single_job"), Some(title)) | (None, Some(title)) => {
            MatchScope::SingleJob(title.to_string())
        }
        (Some("single_job"), None) => {
            return Err(AppError::Validation(
                "job_title is required when scope is single_job".to_string(),
            ))
        }
        (Some("best_job"), _) | (None, None) => MatchScope::BestJob,
        (Some(other), _) => {
            return Err(AppError::Validation(format!(
                "Unknown scope '{other}', expected single_job or best_job"
            )))
        }
    };

    let mode = match get("mode").unwrap_or("overall") {
        "overall" => MatchingMode::Overall,
        "field" => {
            let field = match get("field") {
                Some("roles_responsibility") => JobField::RolesResponsibility,
                Some("skills_required") => JobField::SkillsRequired,
                Some(other) => {
                    return Err(AppError::Validation(format!(
                        "Unknown field '{other}', expected roles_responsibility or skills_required"
                    )))
                }
                None => {
                    return Err(AppError::Validation(
                        "field is required when mode is field".to_string(),
                    ))
                }
            };
            MatchingMode::Field(field)
        }
        other => {
            return Err(AppError::Validation(format!(
                "Unknown mode '{other}', expected overall or field"
            )))
        }
    };

    let split_skills = matches!(
        get("split_skills").map(str::to_ascii_lowercase).as_deref(),
        Some("true" | "on" | "yes" | "1")
    );

    Ok(MatchOptions {
        scope,
        mode,
        split_skills,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_to_best_job_overall() {
        let options = parse_options(&HashMap::new()).unwrap();
        assert_eq!(options.scope, MatchScope::BestJob);
        assert_eq!(options.mode, MatchingMode::Overall);
        assert!(!options.split_skills);
    }

    #[test]
    fn test_job_title_implies_single_job() {
        let options = parse_options(&fields(&[("job_title", " Data Analyst ")])).unwrap();
        assert_eq!(options.scope, MatchScope::SingleJob("Data Analyst".to_string()));
    }

    #[test]
    fn test_explicit_best_job_ignores_title() {
        let options =
            parse_options(&fields(&[("scope", "best_job"), ("job_title", "Data Analyst")]))
                .unwrap();
        assert_eq!(options.scope, MatchScope::BestJob);
    }

    #[test]
    fn test_single_job_without_title_is_rejected() {
        let err = parse_options(&fields(&[("scope", "single_job")])).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_field_mode() {
        let options = parse_options(&fields(&[
            ("mode", "field"),
            ("field", "skills_required"),
            ("split_skills", "on"),
        ]))
        .unwrap();
        assert_eq!(options.mode, MatchingMode::Field(JobField::SkillsRequired));
        assert!(options.split_skills);

        assert!(parse_options(&fields(&[("mode", "field")])).is_err());
        assert!(parse_options(&fields(&[("mode", "field"), ("field", "salary")])).is_err());
        assert!(parse_options(&fields(&[("mode", "fuzzy")])).is_err());
    }
}
