use serde::{Deserialize, Serialize};

use crate::career::timeline::TimeInterval;

pub const DEFAULT_JOB_HOPPING_THRESHOLD_MONTHS: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TenureSummary {
    pub is_job_hopper: bool,
    pub avg_tenure_months: f64,
}

/// Average tenure across all intervals. A career is flagged as job hopping when
/// the mean falls below `threshold_months`; an empty timeline is never flagged.
pub fn detect_job_hopping(timeline: &[TimeInterval], threshold_months: f64) -> TenureSummary {
    if timeline.is_empty() {
        return TenureSummary {
            is_job_hopper: false,
            avg_tenure_months: 0.0,
        };
    }

    let total: i32 = timeline.iter().map(TimeInterval::duration_months).sum();
    let avg_tenure_months = total as f64 / timeline.len() as f64;

    TenureSummary {
        is_job_hopper: avg_tenure_months < threshold_months,
        avg_tenure_months,
    }
}
