// Career history analysis: date ranges → timeline → gaps, tenure, risk.
// Everything here is pure and synchronous; callers supply "today".

pub mod dates;
pub mod gaps;
pub mod handlers;
pub mod risk;
pub mod tenure;
pub mod timeline;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::career::gaps::{detect_career_gaps, max_gap, DEFAULT_GAP_THRESHOLD_MONTHS};
use crate::career::risk::{RiskLevel, RiskPolicy};
use crate::career::tenure::{
    detect_job_hopping, TenureSummary, DEFAULT_JOB_HOPPING_THRESHOLD_MONTHS,
};
use crate::career::timeline::{extract_timeline, TimeInterval};

/// Everything derived from one resume's employment history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerProfile {
    pub timeline: Vec<TimeInterval>,
    pub gaps: Vec<i32>,
    pub max_gap_months: i32,
    pub tenure: TenureSummary,
    pub risk_level: RiskLevel,
    /// Substrings that looked like date ranges but failed to parse.
    pub dropped_ranges: Vec<String>,
}

/// Thresholds and risk policy, fixed for the lifetime of the service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CareerAnalyzer {
    pub gap_threshold_months: u32,
    pub job_hopping_threshold_months: f64,
    pub risk_policy: RiskPolicy,
}

impl Default for CareerAnalyzer {
    fn default() -> Self {
        Self {
            gap_threshold_months: DEFAULT_GAP_THRESHOLD_MONTHS,
            job_hopping_threshold_months: DEFAULT_JOB_HOPPING_THRESHOLD_MONTHS,
            risk_policy: RiskPolicy::default(),
        }
    }
}

impl CareerAnalyzer {
    pub fn analyze(&self, resume_text: &str, today: NaiveDate) -> CareerProfile {
        let extraction = extract_timeline(resume_text, today);
        let gaps = detect_career_gaps(&extraction.timeline, self.gap_threshold_months);
        let max_gap_months = max_gap(&gaps);
        let tenure = detect_job_hopping(&extraction.timeline, self.job_hopping_threshold_months);
        let risk_level = self.risk_policy.classify(max_gap_months, tenure.is_job_hopper);

        CareerProfile {
            timeline: extraction.timeline,
            gaps,
            max_gap_months,
            tenure,
            risk_level,
            dropped_ranges: extraction.dropped_ranges,
        }
    }
}
