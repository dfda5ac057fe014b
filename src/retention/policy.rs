//! Tiered retention policy value object.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How many dailies, weeklies and monthlies to keep, and which weekday /
/// day of month anchor the weekly and monthly cadence.
///
/// Owned by the caller and passed by value into the evaluator; evaluation
/// never mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Keep every backup younger than this many days.
    pub days_to_keep: u32,

    /// Keep one backup per week for this many weeks.
    pub weeks_to_keep: u32,

    /// Keep one backup per month for this many months. Anything older is
    /// purged unconditionally.
    pub months_to_keep: u32,

    /// Weekday whose backup survives weekly pruning. 0 = Monday through
    /// 6 = Sunday.
    pub anchor_weekday: u8,

    /// Day of month whose backup survives monthly pruning, 1 through 31.
    pub anchor_day_of_month: u8,
}

/// Errors raised by [`RetentionPolicy::validate`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PolicyError {
    /// Anchor weekday outside 0..=6.
    #[error("anchor weekday {0} out of range (expected 0-6, Monday = 0)")]
    WeekdayOutOfRange(u8),

    /// Anchor day of month outside 1..=31.
    #[error("anchor day of month {0} out of range (expected 1-31)")]
    DayOfMonthOutOfRange(u8),
}

impl RetentionPolicy {
    /// Check that both anchors are within their calendar ranges.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.anchor_weekday > 6 {
            return Err(PolicyError::WeekdayOutOfRange(self.anchor_weekday));
        }
        if !(1..=31).contains(&self.anchor_day_of_month) {
            return Err(PolicyError::DayOfMonthOutOfRange(self.anchor_day_of_month));
        }
        Ok(())
    }
}
