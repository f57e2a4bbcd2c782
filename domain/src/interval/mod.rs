//! Date-interval normalization.
//!
//! Conversational requests carry time ranges as loose phrases ("today",
//! "last month", "2024-08", "2024-01-01,2024-03-31"). This module turns
//! those phrases into one canonical [`Interval`] and can produce the
//! immediately preceding interval of the same *shape* for period-over-period
//! comparison.
//!
//! ```text
//!  raw expression ──parse──▶ PeriodExpr ──resolve(now)──▶ Interval
//!                                                            │
//!                                              previous_interval(shape-aware)
//!                                                            ▼
//!                                                    preceding Interval
//! ```
//!
//! Intervals are closed on both ends at millisecond granularity: `start` is
//! the first millisecond of its opening day and `end` the last millisecond
//! (23:59:59.999) of its closing day. Store predicates treat them as
//! `start <= t <= end`.
//!
//! The "previous" of a calendar unit is the previous *calendar* unit, not a
//! fixed-length shift: the month before Mar 1–31 is Feb 1–29 on a leap year.
//! Only genuinely custom spans shift by their own length.

mod calendar;
mod expr;
mod value_objects;

pub use calendar::{
    date_range, end_of_day, month_interval, previous_interval, unit_interval, year_floor,
};
pub use expr::{PeriodExpr, PeriodUnit};
pub use value_objects::{Interval, IntervalError, IntervalShape};
