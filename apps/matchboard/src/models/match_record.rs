use serde::{Deserialize, Serialize};

use crate::career::risk::RiskLevel;
use crate::career::CareerProfile;
use crate::jobs::JobPosting;
use crate::matching::scoring::{round1, MatchResult};

/// One scored candidate-job pair, before ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub candidate: String,
    pub job_title: String,
    pub match_score: f64,
    pub skill_score: f64,
    pub experience_score: f64,
    /// Largest gap above threshold, or 0.
    pub career_gap_months: i32,
    pub job_hopping: bool,
    pub avg_tenure_months: f64,
    pub risk_level: RiskLevel,
}

impl MatchRecord {
    pub fn new(
        candidate: &str,
        job: &JobPosting,
        scores: MatchResult,
        profile: &CareerProfile,
    ) -> Self {
        Self {
            candidate: candidate.to_string(),
            job_title: job.title.clone(),
            match_score: scores.match_score,
            skill_score: scores.skill_score,
            experience_score: scores.experience_score,
            career_gap_months: profile.max_gap_months,
            job_hopping: profile.tenure.is_job_hopper,
            avg_tenure_months: round1(profile.tenure.avg_tenure_months),
            risk_level: profile.risk_level,
        }
    }
}

/// A `MatchRecord` with its 1-based position in the ranked batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    pub rank: usize,
    #[serde(flatten)]
    pub record: MatchRecord,
}

/// A candidate that could not be scored. The rest of the batch still runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateFailure {
    pub candidate: String,
    pub reason: String,
}
