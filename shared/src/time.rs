use chrono::{Duration, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;

/// Return the date in given timezone
///
/// Keeps "today" comparisons honest when the process runs in UTC but the
/// shops operate in a local timezone.
///
/// # Example
///```
/// use shared::time::today_in;
/// use chrono_tz::Europe::Malta;
/// let today = today_in(Malta);
/// ```
pub fn today_in(timezone: Tz) -> NaiveDate {
    Utc::now().with_timezone(&timezone).date_naive()
}

/// The seven calendar dates of the week beginning on `monday`, Monday first.
pub fn week_dates(monday: NaiveDate) -> [NaiveDate; 7] {
    std::array::from_fn(|i| monday + Duration::days(i as i64))
}

/// Monday-first index of a weekday (Mon = 0 .. Sun = 6).
pub fn day_index(day: Weekday) -> usize {
    day.num_days_from_monday() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn week_dates_runs_monday_to_sunday() {
        // 2026-02-16 is a Monday
        let monday = NaiveDate::from_ymd_opt(2026, 2, 16).unwrap();
        let dates = week_dates(monday);

        assert_eq!(dates[0], monday);
        assert_eq!(dates[6], NaiveDate::from_ymd_opt(2026, 2, 22).unwrap());
        assert_eq!(dates[0].weekday(), Weekday::Mon);
        assert_eq!(dates[6].weekday(), Weekday::Sun);
    }

    #[test]
    fn day_index_is_monday_first() {
        assert_eq!(day_index(Weekday::Mon), 0);
        assert_eq!(day_index(Weekday::Sat), 5);
        assert_eq!(day_index(Weekday::Sun), 6);
    }
}
