use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const HIGH_GAP_MONTHS: i32 = 12;
const MEDIUM_GAP_MONTHS: i32 = 6;

/// Ordinal risk label attached to every candidate-job row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the gap and job-hopping signals escalate to `High`.
///
/// Both policies agree on `Medium` (`gap > 6 OR hopper`). They differ on `High`:
/// `AnyFlag` escalates on either signal, `BothFlags` needs a long gap and a
/// job-hopping history together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskPolicy {
    #[default]
    AnyFlag,
    BothFlags,
}

impl RiskPolicy {
    pub fn classify(self, max_gap_months: i32, is_job_hopper: bool) -> RiskLevel {
        let long_gap = max_gap_months > HIGH_GAP_MONTHS;
        let high = match self {
            RiskPolicy::AnyFlag => long_gap || is_job_hopper,
            RiskPolicy::BothFlags => long_gap && is_job_hopper,
        };

        if high {
            RiskLevel::High
        } else if max_gap_months > MEDIUM_GAP_MONTHS || is_job_hopper {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl FromStr for RiskPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any_flag" | "any" | "or" => Ok(RiskPolicy::AnyFlag),
            "both_flags" | "both" | "and" => Ok(RiskPolicy::BothFlags),
            other => Err(format!(
                "unknown risk policy '{other}' (expected 'any_flag' or 'both_flags')"
            )),
        }
    }
}
