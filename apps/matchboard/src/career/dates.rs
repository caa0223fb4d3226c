use std::str::FromStr;

use chrono::{Datelike, Month, NaiveDate};

/// Parses a month-precision token such as `"Jan 2020"` or `"January 2020"`.
///
/// Month names are matched case-insensitively in either their three-letter or
/// full English form. The result is pinned to the first day of the month.
pub fn parse_month_year(token: &str) -> Option<NaiveDate> {
    let mut parts = token.split_whitespace();
    let month = parts.next()?;
    let year = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let month = Month::from_str(month).ok()?;
    let year: i32 = year.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month.number_from_month(), 1)
}

/// Truncates a date to the first day of its month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Whole calendar months from `start` to `end`. Day-of-month is ignored, so the
/// result is negative when `end` falls in an earlier month than `start`.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    let years = end.year() - start.year();
    let months = end.month() as i32 - start.month() as i32;
    years * 12 + months
}
