use crate::career::dates::months_between;
use crate::career::timeline::TimeInterval;

pub const DEFAULT_GAP_THRESHOLD_MONTHS: u32 = 6;

/// Month gaps between consecutive intervals that exceed `threshold_months`.
///
/// Expects `timeline` sorted by start. Overlapping intervals produce negative
/// gaps, which can never exceed the threshold and are skipped.
pub fn detect_career_gaps(timeline: &[TimeInterval], threshold_months: u32) -> Vec<i32> {
    let threshold = i32::try_from(threshold_months).unwrap_or(i32::MAX);
    timeline
        .windows(2)
        .map(|pair| months_between(pair[0].end, pair[1].start))
        .filter(|gap| *gap > threshold)
        .collect()
}

/// Largest detected gap, or 0 when none crossed the threshold.
pub fn max_gap(gaps: &[i32]) -> i32 {
    gaps.iter().copied().max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn interval(from: (i32, u32), to: (i32, u32)) -> TimeInterval {
        TimeInterval {
            start: NaiveDate::from_ymd_opt(from.0, from.1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(to.0, to.1, 1).unwrap(),
        }
    }

    #[test]
    fn test_empty_and_single_interval_have_no_gaps() {
        assert!(detect_career_gaps(&[], 6).is_empty());
        let single = [interval((2018, 1), (2019, 6))];
        assert!(detect_career_gaps(&single, 6).is_empty());
    }

    #[test]
    fn test_gap_above_threshold_is_reported() {
        let timeline = [interval((2018, 1), (2019, 6)), interval((2020, 9), (2024, 3))];
        assert_eq!(detect_career_gaps(&timeline, 6), vec![15]);
    }

    #[test]
    fn test_gap_equal_to_threshold_is_not_reported() {
        let timeline = [interval((2018, 1), (2018, 6)), interval((2018, 12), (2019, 6))];
        assert!(detect_career_gaps(&timeline, 6).is_empty());
        assert_eq!(detect_career_gaps(&timeline, 5), vec![6]);
    }

    #[test]
    fn test_back_to_back_roles_have_no_gaps() {
        let timeline = [
            interval((2021, 1), (2021, 6)),
            interval((2021, 7), (2021, 12)),
            interval((2022, 1), (2022, 6)),
        ];
        assert!(detect_career_gaps(&timeline, 6).is_empty());
    }

    #[test]
    fn test_overlapping_intervals_do_not_panic() {
        let timeline = [interval((2018, 1), (2022, 1)), interval((2019, 1), (2020, 1))];
        assert!(detect_career_gaps(&timeline, 0).is_empty());
    }

    #[test]
    fn test_huge_threshold_reports_nothing() {
        let timeline = [interval((2010, 1), (2011, 1)), interval((2020, 1), (2021, 1))];
        assert_eq!(detect_career_gaps(&timeline, 6), vec![108]);
        assert!(detect_career_gaps(&timeline, u32::MAX).is_empty());
    }

    #[test]
    fn test_max_gap() {
        assert_eq!(max_gap(&[]), 0);
        assert_eq!(max_gap(&[8, 15, 9]), 15);
    }
}
