//! Batch matching: every uploaded candidate against the selected jobs, then ranked.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::career::CareerAnalyzer;
use crate::errors::AppError;
use crate::jobs::{JobCorpus, JobField, JobPosting};
use crate::matching::scoring::ScoreComposer;
use crate::matching::similarity::{BatchSimilarityCache, SimilarityProvider};
use crate::matching::summary::{summarize, BatchSummary};
use crate::models::match_record::{CandidateFailure, MatchRecord, RankedMatch};
use crate::resume::ExtractError;

/// Which jobs each candidate is scored against, and what is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchScope {
    /// Only postings with this title.
    SingleJob(String),
    /// Every posting, keeping each candidate's highest-scoring job.
    BestJob,
}

/// Which job text the resume is compared with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingMode {
    /// Responsibilities and skills combined.
    #[default]
    Overall,
    Field(JobField),
}

#[derive(Debug, Clone)]
pub struct MatchOptions {
    pub scope: MatchScope,
    pub mode: MatchingMode,
    /// Score skills one by one from the job's skills column.
    pub split_skills: bool,
}

/// An uploaded resume after text extraction, successful or not.
#[derive(Debug)]
pub struct CandidateUpload {
    pub candidate: String,
    pub text: Result<String, ExtractError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchBatch {
    pub run_id: Uuid,
    pub similarity_backend: String,
    pub results: Vec<RankedMatch>,
    pub failures: Vec<CandidateFailure>,
    pub summary: BatchSummary,
}

/// Borrowed view of the shared services one batch needs.
pub struct BatchRunner<'a> {
    pub jobs: &'a JobCorpus,
    pub analyzer: &'a CareerAnalyzer,
    pub composer: &'a ScoreComposer,
    pub similarity: &'a dyn SimilarityProvider,
}

impl BatchRunner<'_> {
    pub async fn run(
        &self,
        uploads: Vec<CandidateUpload>,
        options: &MatchOptions,
        today: NaiveDate,
    ) -> Result<MatchBatch, AppError> {
        if uploads.is_empty() {
            return Err(AppError::NoData("no resumes were uploaded".to_string()));
        }
        if self.jobs.is_empty() {
            return Err(AppError::NoData("the job corpus is empty".to_string()));
        }

        let jobs: Vec<&JobPosting> = match &options.scope {
            MatchScope::SingleJob(title) => {
                let selected: Vec<_> = self.jobs.with_title(title).collect();
                if selected.is_empty() {
                    return Err(AppError::NotFound(format!("Job '{title}' not found")));
                }
                selected
            }
            MatchScope::BestJob => self.jobs.jobs().iter().collect(),
        };

        let run_id = Uuid::new_v4();
        info!(
            %run_id,
            "Matching {} resumes against {} jobs",
            uploads.len(),
            jobs.len()
        );

        let cache = BatchSimilarityCache::new(self.similarity);
        let mut records = Vec::new();
        let mut failures = Vec::new();

        for upload in uploads {
            let text = match upload.text {
                Ok(text) => text,
                Err(e) => {
                    warn!(%run_id, "Skipping '{}': {e}", upload.candidate);
                    failures.push(CandidateFailure {
                        candidate: upload.candidate,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match self
                .score_candidate(&cache, &upload.candidate, &text, &jobs, options, today)
                .await
            {
                Ok(rows) => records.extend(rows),
                Err(reason) => {
                    warn!(%run_id, "Scoring failed for '{}': {reason}", upload.candidate);
                    failures.push(CandidateFailure {
                        candidate: upload.candidate,
                        reason,
                    });
                }
            }
        }

        debug!(%run_id, "Similarity cache holds {} pairs", cache.len());

        if options.scope == MatchScope::BestJob {
            records = best_job_per_candidate(records);
        }

        let results = rank(records);
        let summary = summarize(&results);

        info!(
            %run_id,
            "Ranked {} rows, {} candidates failed",
            results.len(),
            failures.len()
        );

        Ok(MatchBatch {
            run_id,
            similarity_backend: self.similarity.backend().to_string(),
            results,
            failures,
            summary,
        })
    }

    /// All rows for one candidate, or the reason the candidate failed.
    /// A failure on any job discards the candidate's other rows.
    async fn score_candidate(
        &self,
        similarity: &dyn SimilarityProvider,
        candidate: &str,
        text: &str,
        jobs: &[&JobPosting],
        options: &MatchOptions,
        today: NaiveDate,
    ) -> Result<Vec<MatchRecord>, String> {
        let profile = self.analyzer.analyze(text, today);
        if !profile.dropped_ranges.is_empty() {
            debug!(
                "'{}': ignored {} unparseable date ranges",
                candidate,
                profile.dropped_ranges.len()
            );
        }

        let mut rows = Vec::with_capacity(jobs.len());
        for job in jobs {
            let job_text = match options.mode {
                MatchingMode::Overall => job.combined_jd.as_str(),
                MatchingMode::Field(field) => job.field(field),
            };
            let skills = if options.split_skills {
                job.skill_list()
            } else {
                Vec::new()
            };

            let scores = self
                .composer
                .compose(similarity, text, job_text, &skills)
                .await
                .map_err(|e| e.to_string())?;

            rows.push(MatchRecord::new(candidate, job, scores, &profile));
        }
        Ok(rows)
    }
}

/// Keeps each candidate's highest-scoring row. On a tie the earlier job wins.
/// Candidates stay in first-seen order.
pub fn best_job_per_candidate(records: Vec<MatchRecord>) -> Vec<MatchRecord> {
    let mut best: Vec<MatchRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        match index.get(&record.candidate) {
            Some(&i) => {
                if record.match_score > best[i].match_score {
                    best[i] = record;
                }
            }
            None => {
                index.insert(record.candidate.clone(), best.len());
                best.push(record);
            }
        }
    }
    best
}

/// Stable descending sort by match score; equal scores keep insertion order.
pub fn rank(mut records: Vec<MatchRecord>) -> Vec<RankedMatch> {
    records.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| RankedMatch {
            rank: i + 1,
            record,
        })
        .collect()
}
