//! Calendar arithmetic for retention boundaries.
//!
//! Retention zones are anchored at "N months ago", "N weeks ago" and
//! "N days ago" relative to a reference instant. Week and day offsets are
//! plain duration arithmetic; month offsets need calendar-correct handling
//! of variable month lengths and leap years.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// Gregorian leap-year rule: divisible by 4 and (not by 100, or by 400).
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in the given month. `month` must be in `1..=12`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    const DAYS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    debug_assert!((1..=12).contains(&month));
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS[(month - 1) as usize]
    }
}

/// Add a (possibly negative) number of calendar months to `dt`.
///
/// The month index wraps modulo 12, carrying into the year. The day of
/// month is clamped to the last valid day of the resulting month, so
/// Jan 31 minus one month lands on Feb 28 (Feb 29 in a leap year). The
/// time of day is preserved.
pub fn add_months(dt: NaiveDateTime, delta: i32) -> NaiveDateTime {
    let date = dt.date();
    let months = date.year() * 12 + date.month0() as i32 + delta;
    let year = months.div_euclid(12);
    let month = months.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));

    NaiveDate::from_ymd_opt(year, month, day)
        .expect("day clamped to month length is always valid")
        .and_time(dt.time())
}

/// Add a (possibly negative) number of weeks to `dt`. No clamping needed.
pub fn add_weeks(dt: NaiveDateTime, delta: i64) -> NaiveDateTime {
    dt + Duration::weeks(delta)
}

/// Add a (possibly negative) number of days to `dt`. No clamping needed.
pub fn add_days(dt: NaiveDateTime, delta: i64) -> NaiveDateTime {
    dt + Duration::days(delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_leap_year_rule() {
        assert!(is_leap_year(2012));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2014));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2014, 1), 31);
        assert_eq!(days_in_month(2014, 2), 28);
        assert_eq!(days_in_month(2012, 2), 29);
        assert_eq!(days_in_month(2014, 4), 30);
    }

    #[test]
    fn test_add_months_wraps_year() {
        assert_eq!(add_months(dt(2014, 11, 11), 2), dt(2015, 1, 11));
        assert_eq!(add_months(dt(2014, 2, 15), -3), dt(2013, 11, 15));
        assert_eq!(add_months(dt(2014, 6, 1), -18), dt(2012, 12, 1));
    }

    #[test]
    fn test_add_months_clamps_day() {
        assert_eq!(add_months(dt(2014, 1, 31), 1), dt(2014, 2, 28));
        assert_eq!(add_months(dt(2012, 1, 31), 1), dt(2012, 2, 29));
        assert_eq!(add_months(dt(2014, 3, 31), -1), dt(2014, 2, 28));
        assert_eq!(add_months(dt(2014, 5, 31), 1), dt(2014, 6, 30));
    }

    #[test]
    fn test_add_months_round_trip_without_clamping() {
        for &(y, m, d) in &[(2014, 11, 11), (2013, 5, 5), (2014, 2, 28)] {
            let base = dt(y, m, d);
            for n in [1, 5, 12, -7, -24] {
                assert_eq!(add_months(add_months(base, n), -n), base);
            }
        }
    }

    #[test]
    fn test_add_months_clamping_is_not_symmetric() {
        // Jan 31 -> Feb 28 -> Mar 28, not back to Mar 31.
        let clamped = add_months(dt(2014, 1, 31), 1);
        assert_eq!(clamped, dt(2014, 2, 28));
        assert_eq!(add_months(clamped, 1), dt(2014, 3, 28));
    }

    #[test]
    fn test_add_months_preserves_time_of_day() {
        let base = NaiveDate::from_ymd_opt(2014, 11, 11)
            .unwrap()
            .and_hms_opt(13, 37, 42)
            .unwrap();
        let shifted = add_months(base, -12);
        assert_eq!(shifted.date(), NaiveDate::from_ymd_opt(2013, 11, 11).unwrap());
        assert_eq!(shifted.time(), base.time());
    }

    #[test]
    fn test_add_weeks_and_days() {
        assert_eq!(add_weeks(dt(2014, 11, 11), -4), dt(2014, 10, 14));
        assert_eq!(add_days(dt(2014, 11, 11), -7), dt(2014, 11, 4));
        assert_eq!(add_days(dt(2014, 1, 1), -1), dt(2013, 12, 31));
    }
}
