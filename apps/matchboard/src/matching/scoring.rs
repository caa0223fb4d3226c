//! Score Composer: blends semantic, skill and experience signals into one match score.

use serde::{Deserialize, Serialize};

use crate::matching::similarity::{SimilarityError, SimilarityProvider};

/// Weights for the composite score. Sub-scores are in [0, 1], so the weights
/// summing to 1.0 keeps the composite in [0, 1] as well.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub semantic: f64,
    pub skill: f64,
    pub experience: f64,
    /// Experience proxy = semantic × this factor.
    pub experience_factor: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            semantic: 0.5,
            skill: 0.4,
            experience: 0.1,
            experience_factor: 0.8,
        }
    }
}

/// Scores for one candidate-job pair, each on a 0-100 scale, two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_score: f64,
    pub skill_score: f64,
    pub experience_score: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreComposer {
    weights: ScoreWeights,
}

impl ScoreComposer {
    /// Scores `resume_text` against `job_text`.
    ///
    /// With a non-empty `skills` list the skill score is the mean similarity of
    /// the resume to each skill; otherwise it falls back to the semantic score.
    pub async fn compose(
        &self,
        provider: &dyn SimilarityProvider,
        resume_text: &str,
        job_text: &str,
        skills: &[String],
    ) -> Result<MatchResult, SimilarityError> {
        let semantic = provider.similarity(resume_text, job_text).await?;

        let skills: Vec<&str> = skills
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();

        let skill = if skills.is_empty() {
            semantic
        } else {
            let mut total = 0.0;
            for skill in &skills {
                total += provider.similarity(resume_text, skill).await?.clamp(0.0, 1.0);
            }
            total / skills.len() as f64
        };

        Ok(self.combine(semantic, skill))
    }

    /// The pure weighting step. Inputs are clamped to [0, 1].
    pub fn combine(&self, semantic: f64, skill: f64) -> MatchResult {
        let w = &self.weights;
        let semantic = semantic.clamp(0.0, 1.0);
        let skill = skill.clamp(0.0, 1.0);
        // Not derived from the career timeline; kept as a fixed proxy.
        let experience = semantic * w.experience_factor;

        let composite = w.semantic * semantic + w.skill * skill + w.experience * experience;

        MatchResult {
            match_score: round2(composite * 100.0),
            skill_score: round2(skill * 100.0),
            experience_score: round2(experience * 100.0),
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
