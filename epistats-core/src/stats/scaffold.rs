//! Calendar-complete day scaffold
//!
//! All per-metric results are joined by date equality against this sequence,
//! and the positional week-over-week fallback in the aggregation relies on
//! it having no gaps.

use chrono::{Duration, NaiveDate};

use crate::types::DayRecord;

/// Build the day scaffold for `[start, end)`.
///
/// The result is strictly ascending with exactly one record per date and no
/// gaps. `start == end` yields an empty scaffold, which callers treat as
/// "no history available".
pub fn fill_days(start: NaiveDate, end: NaiveDate) -> Vec<DayRecord> {
    let mut days = Vec::new();
    let mut day = start;
    while day < end {
        days.push(DayRecord::new(day));
        day += Duration::days(1);
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_length_matches_day_span() {
        let days = fill_days(date(2020, 6, 1), date(2020, 6, 10));
        assert_eq!(days.len(), 9);
    }

    #[test]
    fn test_dates_ascending_without_gaps() {
        let days = fill_days(date(2020, 2, 27), date(2020, 3, 2));

        let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2020, 2, 27),
                date(2020, 2, 28),
                date(2020, 2, 29),
                date(2020, 3, 1),
            ]
        );
    }

    #[test]
    fn test_empty_range() {
        assert!(fill_days(date(2020, 6, 1), date(2020, 6, 1)).is_empty());
    }

    #[test]
    fn test_end_before_start_is_empty() {
        assert!(fill_days(date(2020, 6, 10), date(2020, 6, 1)).is_empty());
    }

    #[test]
    fn test_all_fields_unset() {
        let days = fill_days(date(2020, 6, 1), date(2020, 6, 3));
        assert!(days
            .iter()
            .all(|d| d.new_infections.is_none() && d.covid_codes_entered.is_none()));
    }
}
