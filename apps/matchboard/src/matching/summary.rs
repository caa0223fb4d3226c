//! Executive summary and chart series for a ranked batch.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::career::risk::RiskLevel;
use crate::matching::scoring::round2;
use crate::models::match_record::RankedMatch;

const HISTOGRAM_BINS: usize = 10;
const BIN_WIDTH: f64 = 100.0 / HISTOGRAM_BINS as f64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskCount {
    pub risk_level: RiskLevel,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Distinct candidate names across all rows.
    pub total_candidates: usize,
    pub average_match_score: f64,
    pub high_risk_rows: usize,
    pub score_histogram: Vec<HistogramBin>,
    pub risk_distribution: Vec<RiskCount>,
}

pub fn summarize(results: &[RankedMatch]) -> BatchSummary {
    let total_candidates = results
        .iter()
        .map(|r| r.record.candidate.as_str())
        .collect::<HashSet<_>>()
        .len();

    let average_match_score = if results.is_empty() {
        0.0
    } else {
        let total: f64 = results.iter().map(|r| r.record.match_score).sum();
        round2(total / results.len() as f64)
    };

    let mut counts = [0usize; HISTOGRAM_BINS];
    for r in results {
        // 100.0 lands in the last bin.
        let bin = ((r.record.match_score / BIN_WIDTH).floor().max(0.0) as usize)
            .min(HISTOGRAM_BINS - 1);
        counts[bin] += 1;
    }
    let score_histogram = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| HistogramBin {
            lower: i as f64 * BIN_WIDTH,
            upper: (i + 1) as f64 * BIN_WIDTH,
            count,
        })
        .collect();

    let risk_distribution: Vec<RiskCount> = RiskLevel::ALL
        .iter()
        .map(|&level| RiskCount {
            risk_level: level,
            count: results
                .iter()
                .filter(|r| r.record.risk_level == level)
                .count(),
        })
        .collect();

    let high_risk_rows = risk_distribution
        .iter()
        .find(|c| c.risk_level == RiskLevel::High)
        .map(|c| c.count)
        .unwrap_or(0);

    BatchSummary {
        total_candidates,
        average_match_score,
        high_risk_rows,
        score_histogram,
        risk_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::match_record::MatchRecord;

    fn ranked(rank: usize, candidate: &str, score: f64, risk: RiskLevel) -> RankedMatch {
        RankedMatch {
            rank,
            record: MatchRecord {
                candidate: candidate.to_string(),
                job_title: "Backend Engineer".to_string(),
                match_score: score,
                skill_score: score,
                experience_score: score,
                career_gap_months: 0,
                job_hopping: false,
                avg_tenure_months: 24.0,
                risk_level: risk,
            },
        }
    }

    #[test]
    fn test_empty_batch_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_candidates, 0);
        assert_eq!(summary.average_match_score, 0.0);
        assert_eq!(summary.high_risk_rows, 0);
        assert_eq!(summary.score_histogram.len(), 10);
        assert!(summary.score_histogram.iter().all(|b| b.count == 0));
    }

    #[test]
    fn test_summary_counts() {
        let results = vec![
            ranked(1, "alice", 100.0, RiskLevel::Low),
            ranked(2, "bob", 55.5, RiskLevel::High),
            ranked(3, "alice", 9.99, RiskLevel::High),
        ];
        let summary = summarize(&results);

        assert_eq!(summary.total_candidates, 2);
        assert_eq!(summary.average_match_score, 55.16);
        assert_eq!(summary.high_risk_rows, 2);

        assert_eq!(summary.score_histogram[0].count, 1);
        assert_eq!(summary.score_histogram[5].count, 1);
        assert_eq!(summary.score_histogram[9].count, 1);
        assert_eq!(summary.score_histogram[9].upper, 100.0);

        let risk: Vec<_> = summary
            .risk_distribution
            .iter()
            .map(|c| (c.risk_level, c.count))
            .collect();
        assert_eq!(
            risk,
            vec![(RiskLevel::Low, 1), (RiskLevel::Medium, 0), (RiskLevel::High, 2)]
        );
    }
}
