//! Date interval extraction: turns free resume text into an ordered experience timeline.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::career::dates::{month_start, months_between, parse_month_year};

/// `<Month> <Year> - <Month> <Year>` or `<Month> <Year> – Present`.
static DATE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z]{3,9}\s[0-9]{4})\s*[-–]\s*((?i:present)|[A-Za-z]{3,9}\s[0-9]{4})")
        .expect("date range pattern is a valid regex")
});

/// One employment span at month precision. `start <= end` is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeInterval {
    pub fn duration_months(&self) -> i32 {
        months_between(self.start, self.end)
    }
}

/// Output of a scan: the accepted intervals sorted by start, plus the raw
/// matches that looked like a date range but did not parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineExtraction {
    pub timeline: Vec<TimeInterval>,
    pub dropped_ranges: Vec<String>,
}

/// Scans `text` for date ranges. `today` stands in for "Present".
pub fn extract_timeline(text: &str, today: NaiveDate) -> TimelineExtraction {
    let mut extraction = TimelineExtraction::default();

    for caps in DATE_RANGE.captures_iter(text) {
        let start_token = &caps[1];
        let end_token = &caps[2];

        let start = parse_month_year(start_token);
        let end = if end_token.eq_ignore_ascii_case("present") {
            Some(month_start(today))
        } else {
            parse_month_year(end_token)
        };

        match (start, end) {
            (Some(start), Some(end)) => extraction.timeline.push(TimeInterval { start, end }),
            _ => {
                debug!("Dropping unparseable date range '{}'", &caps[0]);
                extraction.dropped_ranges.push(caps[0].to_string());
            }
        }
    }

    // Stable: equal starts keep their order of appearance.
    extraction.timeline.sort_by_key(|interval| interval.start);
    extraction
}
