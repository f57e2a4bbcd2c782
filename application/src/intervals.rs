//! Interval resolution service.
//!
//! Thin orchestration over the pure calendar logic in the domain crate: the
//! clock supplies "now", and the activity timeline supplies the earliest
//! record for the `all` period. Everything else is delegation.

use std::sync::Arc;

use bursar_domain::core::UserId;
use bursar_domain::interval::{
    Interval, IntervalError, PeriodExpr, date_range, end_of_day, month_interval,
    previous_interval, unit_interval, year_floor,
};
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::ports::clock::Clock;
use crate::ports::stores::ActivityTimeline;

#[derive(Clone)]
pub struct IntervalResolver {
    clock: Arc<dyn Clock>,
    timeline: Arc<dyn ActivityTimeline>,
}

impl IntervalResolver {
    pub fn new(clock: Arc<dyn Clock>, timeline: Arc<dyn ActivityTimeline>) -> Self {
        Self { clock, timeline }
    }

    /// Normalize a duration expression to a closed timestamp interval.
    /// Absent or unrecognized expressions default to the current month.
    pub async fn resolve(
        &self,
        user: &UserId,
        expr: Option<&str>,
    ) -> Result<Interval, IntervalError> {
        let now = self.clock.now();
        match PeriodExpr::parse(expr)? {
            PeriodExpr::Unit(unit) => Ok(unit_interval(unit, now)),
            PeriodExpr::Month { year, month } => month_interval(year, month),
            PeriodExpr::Range { start, end } => date_range(start, end),
            PeriodExpr::AllTime => Ok(self.all_time(user, now).await),
        }
    }

    /// The immediately preceding interval of the same shape.
    pub fn previous(&self, current: &Interval) -> Interval {
        previous_interval(current)
    }

    /// `all`: from the start of the earliest record's year through the end
    /// of today. A timeline failure falls back to the current year rather
    /// than failing the whole resolution.
    async fn all_time(&self, user: &UserId, now: DateTime<Utc>) -> Interval {
        let basis = match self.timeline.earliest_record(user).await {
            // Future-dated records must not push the start past now.
            Ok(Some(earliest)) => earliest.min(now),
            Ok(None) => now,
            Err(err) => {
                warn!(error = %err, "earliest-record lookup failed; using the current year");
                now
            }
        };
        Interval {
            start: year_floor(basis),
            end: end_of_day(now),
        }
    }
}
