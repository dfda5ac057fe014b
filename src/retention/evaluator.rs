//! Pure retention evaluation over artifact timestamps.
//!
//! The policy partitions the timeline relative to a reference instant into
//! four zones, oldest first:
//!
//! 1. **Purge zone** (older than `months_to_keep` months): everything is
//!    marked for deletion.
//! 2. **Monthly zone** (between `months_to_keep` months and
//!    `weeks_to_keep` weeks ago): only the artifact on the day-of-month
//!    anchor survives each month.
//! 3. **Weekly zone** (between `weeks_to_keep` weeks and `days_to_keep`
//!    days ago): only the artifact on the weekday anchor survives each
//!    week. The day-of-month anchor is spared here too, so the monthly
//!    cadence is never broken by weekly pruning; one extra backup usually
//!    survives the transition zone as a consequence. That is deliberate.
//! 4. **Daily zone** (younger than `days_to_keep` days): nothing is ever
//!    marked.
//!
//! Each zone filter is a pure function returning the set of indices it
//! would delete; [`evaluate`] is the union of the three. The set dedups
//! the intentional overlap at the weekly/monthly boundary.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, NaiveDateTime};

use super::policy::RetentionPolicy;
use crate::calendar::{add_days, add_months, add_weeks};

fn unix_seconds(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp()
}

/// Calendar fields of a Unix timestamp, interpreted in UTC.
///
/// `None` for timestamps outside chrono's representable range; such
/// artifacts are never matched by the anchored filters.
fn calendar_fields(ts: i64) -> Option<(u8, u8)> {
    let dt = DateTime::from_timestamp(ts, 0)?;
    let day = dt.day() as u8;
    let weekday = dt.weekday().num_days_from_monday() as u8;
    Some((day, weekday))
}

/// Indices of timestamps older than `months_to_keep` months before `now`.
///
/// Everything here is deleted unconditionally; no artifact survives past
/// the configured number of months. With `months_to_keep == 0` the cutoff
/// is `now` itself and anything strictly older is marked.
pub fn purge_zone(dates: &[i64], policy: RetentionPolicy, now: NaiveDateTime) -> BTreeSet<usize> {
    let oldest_to_keep = unix_seconds(add_months(now, -(policy.months_to_keep as i32)));

    dates
        .iter()
        .enumerate()
        .filter(|&(_, &ts)| ts < oldest_to_keep)
        .map(|(idx, _)| idx)
        .collect()
}

/// Indices of timestamps between `months_to_keep` months and
/// `weeks_to_keep` weeks before `now` that miss the day-of-month anchor.
pub fn monthly_zone(dates: &[i64], policy: RetentionPolicy, now: NaiveDateTime) -> BTreeSet<usize> {
    let oldest = unix_seconds(add_months(now, -(policy.months_to_keep as i32)));
    let newest = unix_seconds(add_weeks(now, -(policy.weeks_to_keep as i64)));

    dates
        .iter()
        .enumerate()
        .filter_map(|(idx, &ts)| {
            let (day, _) = calendar_fields(ts)?;
            (ts >= oldest && ts <= newest && day != policy.anchor_day_of_month).then_some(idx)
        })
        .collect()
}

/// Indices of timestamps between `weeks_to_keep` weeks and `days_to_keep`
/// days before `now` that miss both the weekday anchor and the
/// day-of-month anchor.
pub fn weekly_zone(dates: &[i64], policy: RetentionPolicy, now: NaiveDateTime) -> BTreeSet<usize> {
    let oldest = unix_seconds(add_weeks(now, -(policy.weeks_to_keep as i64)));
    let newest = unix_seconds(add_days(now, -(policy.days_to_keep as i64)));

    dates
        .iter()
        .enumerate()
        .filter_map(|(idx, &ts)| {
            let (day, weekday) = calendar_fields(ts)?;
            (ts >= oldest
                && ts <= newest
                && day != policy.anchor_day_of_month
                && weekday != policy.anchor_weekday)
                .then_some(idx)
        })
        .collect()
}

/// Evaluate the full policy: the union of the three zone filters.
///
/// Pure and referentially transparent; the same `(dates, policy, now)`
/// always yields the same decision set. Timestamps in the future relative
/// to `now` fall in no zone and are always kept.
pub fn evaluate(dates: &[i64], policy: RetentionPolicy, now: NaiveDateTime) -> BTreeSet<usize> {
    let mut marked = purge_zone(dates, policy, now);
    marked.extend(monthly_zone(dates, policy, now));
    marked.extend(weekly_zone(dates, policy, now));
    marked
}
