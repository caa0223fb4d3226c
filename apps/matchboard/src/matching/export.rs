//! Ranked results as CSV, in the column layout recruiters download from the dashboard.

use std::io::Read;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::career::risk::RiskLevel;
use crate::models::match_record::{MatchRecord, RankedMatch};

pub const EXPORT_FILE_NAME: &str = "ranked_candidates.csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct ExportRow {
    #[serde(rename = "Rank")]
    rank: usize,
    #[serde(rename = "Candidate")]
    candidate: String,
    #[serde(rename = "Job_Title")]
    job_title: String,
    #[serde(rename = "Match_Score")]
    match_score: f64,
    #[serde(rename = "Skill_Score")]
    skill_score: f64,
    #[serde(rename = "Experience_Score")]
    experience_score: f64,
    #[serde(rename = "Career_Gap_Months")]
    career_gap_months: i32,
    #[serde(rename = "Job_Hopping", with = "yes_no")]
    job_hopping: bool,
    #[serde(rename = "Avg_Tenure_Months")]
    avg_tenure_months: f64,
    #[serde(rename = "Risk_Level")]
    risk_level: RiskLevel,
}

impl From<&RankedMatch> for ExportRow {
    fn from(ranked: &RankedMatch) -> Self {
        let r = &ranked.record;
        Self {
            rank: ranked.rank,
            candidate: r.candidate.clone(),
            job_title: r.job_title.clone(),
            match_score: r.match_score,
            skill_score: r.skill_score,
            experience_score: r.experience_score,
            career_gap_months: r.career_gap_months,
            job_hopping: r.job_hopping,
            avg_tenure_months: r.avg_tenure_months,
            risk_level: r.risk_level,
        }
    }
}

impl From<ExportRow> for RankedMatch {
    fn from(row: ExportRow) -> Self {
        Self {
            rank: row.rank,
            record: MatchRecord {
                candidate: row.candidate,
                job_title: row.job_title,
                match_score: row.match_score,
                skill_score: row.skill_score,
                experience_score: row.experience_score,
                career_gap_months: row.career_gap_months,
                job_hopping: row.job_hopping,
                avg_tenure_months: row.avg_tenure_months,
                risk_level: row.risk_level,
            },
        }
    }
}

/// `Yes` / `No` in the sheet, `bool` in memory.
mod yes_no {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "Yes" } else { "No" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" => Ok(true),
            "no" | "false" => Ok(false),
            other => Err(D::Error::custom(format!("expected Yes or No, got '{other}'"))),
        }
    }
}

/// Serializes the ranked batch with a header row, one line per result.
pub fn write_ranked_csv(results: &[RankedMatch]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if results.is_empty() {
        // serde only emits headers alongside the first record.
        writer.write_record([
            "Rank",
            "Candidate",
            "Job_Title",
            "Match_Score",
            "Skill_Score",
            "Experience_Score",
            "Career_Gap_Months",
            "Job_Hopping",
            "Avg_Tenure_Months",
            "Risk_Level",
        ])?;
    }
    for ranked in results {
        writer.serialize(ExportRow::from(ranked))?;
    }
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

/// Parses a CSV produced by `write_ranked_csv`.
pub fn read_ranked_csv<R: Read>(reader: R) -> Result<Vec<RankedMatch>, ExportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut results = Vec::new();
    for row in reader.deserialize::<ExportRow>() {
        results.push(row?.into());
    }
    Ok(results)
}
