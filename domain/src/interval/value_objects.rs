//! Interval value objects and their validation errors.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Validation failures while reading a duration expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalError {
    #[error("could not read `{0}` as a calendar date (expected YYYY-MM-DD)")]
    UnparsableDate(String),

    #[error("range must start before it ends: {start} to {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },
}

/// A bounded time range, closed on both ends at millisecond granularity.
///
/// `start < end` always holds for values built through [`Interval::new`] or
/// the calendar constructors; code assembling one from parts it has already
/// ordered may use the struct literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Build an interval, rejecting `start >= end` rather than swapping.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, IntervalError> {
        if start >= end {
            return Err(IntervalError::StartAfterEnd {
                start: start.date_naive(),
                end: end.date_naive(),
            });
        }
        Ok(Interval { start, end })
    }

    /// Whether `t` falls inside the closed bounds.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }

    /// Inclusive count of calendar days the interval touches.
    ///
    /// A single day is 1; Mar 1 through Mar 31 is 31 regardless of the
    /// sub-day boundary times.
    pub fn day_span(&self) -> i64 {
        (self.end.date_naive() - self.start.date_naive()).num_days() + 1
    }

    /// Shape classification of this interval's span.
    pub fn shape(&self) -> IntervalShape {
        IntervalShape::classify(self.day_span())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start.date_naive(), self.end.date_naive())
    }
}

/// Calendar classification of an interval's length, used to pick how its
/// preceding interval is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalShape {
    Day,
    Week,
    Month,
    Year,
    /// Anything that is not a recognizable calendar unit; carries the
    /// inclusive day count.
    #[serde(untagged)]
    Custom(i64),
}

impl IntervalShape {
    /// Classify an inclusive day span.
    ///
    /// The bands are deliberately generous: any span up to a week compares
    /// week-over-week, any 28–31-day span compares month-over-month, and
    /// 365–366 days compares year-over-year.
    pub fn classify(span_days: i64) -> IntervalShape {
        match span_days {
            ..=1 => IntervalShape::Day,
            2..=7 => IntervalShape::Week,
            28..=31 => IntervalShape::Month,
            365..=366 => IntervalShape::Year,
            n => IntervalShape::Custom(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn new_rejects_reversed_bounds() {
        let start = ts(2024, 3, 10, 0, 0, 0);
        let end = ts(2024, 3, 1, 0, 0, 0);
        assert!(matches!(
            Interval::new(start, end),
            Err(IntervalError::StartAfterEnd { .. })
        ));
    }

    #[test]
    fn contains_is_closed_on_both_ends() {
        let iv = Interval::new(ts(2024, 1, 1, 0, 0, 0), ts(2024, 1, 31, 23, 59, 59)).unwrap();
        assert!(iv.contains(iv.start));
        assert!(iv.contains(iv.end));
        assert!(!iv.contains(ts(2024, 2, 1, 0, 0, 0)));
    }

    #[test]
    fn day_span_counts_inclusively() {
        let one_day = Interval::new(ts(2024, 3, 15, 0, 0, 0), ts(2024, 3, 15, 23, 59, 59)).unwrap();
        assert_eq!(one_day.day_span(), 1);

        let march = Interval::new(ts(2024, 3, 1, 0, 0, 0), ts(2024, 3, 31, 23, 59, 59)).unwrap();
        assert_eq!(march.day_span(), 31);
    }

    #[test]
    fn classify_bands() {
        assert_eq!(IntervalShape::classify(1), IntervalShape::Day);
        assert_eq!(IntervalShape::classify(7), IntervalShape::Week);
        assert_eq!(IntervalShape::classify(28), IntervalShape::Month);
        assert_eq!(IntervalShape::classify(31), IntervalShape::Month);
        assert_eq!(IntervalShape::classify(365), IntervalShape::Year);
        assert_eq!(IntervalShape::classify(366), IntervalShape::Year);
        assert_eq!(IntervalShape::classify(10), IntervalShape::Custom(10));
        assert_eq!(IntervalShape::classify(90), IntervalShape::Custom(90));
    }
}
