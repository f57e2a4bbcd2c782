//! Calendar arithmetic: unit bounds and the shape-aware preceding interval.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc, Weekday};

use super::expr::PeriodUnit;
use super::value_objects::{Interval, IntervalError, IntervalShape};

/// Resolve a named unit against `now`.
///
/// The `last*` units are the previous interval of their `this*` counterpart,
/// which keeps them on the same shape-aware rules as every other comparison.
pub fn unit_interval(unit: PeriodUnit, now: DateTime<Utc>) -> Interval {
    let today = now.date_naive();
    match unit {
        PeriodUnit::Today => span_of(today, today),
        PeriodUnit::Yesterday => previous_interval(&span_of(today, today)),
        PeriodUnit::ThisWeek => week_of(today),
        PeriodUnit::LastWeek => previous_interval(&week_of(today)),
        PeriodUnit::ThisMonth => month_of(today),
        PeriodUnit::LastMonth => previous_interval(&month_of(today)),
        PeriodUnit::ThisYear => year_of(today),
        PeriodUnit::LastYear => previous_interval(&year_of(today)),
    }
}

/// Interval covering one literal calendar month.
pub fn month_interval(year: i32, month: u32) -> Result<Interval, IntervalError> {
    month_span(year, month).ok_or_else(|| IntervalError::UnparsableDate(format!("{year}-{month:02}")))
}

/// Interval covering an explicit date range, floored and ceilinged to the
/// day boundaries. A same-day range is legal and covers that single day.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Result<Interval, IntervalError> {
    Interval::new(day_start(start), day_end(end))
}

/// The interval immediately preceding `current`, with the same shape.
///
/// Calendar units step back one calendar unit (so month lengths and leap
/// years are respected); custom spans step back by their own length, landing
/// flush against `current`.
pub fn previous_interval(current: &Interval) -> Interval {
    match current.shape() {
        IntervalShape::Day => shift_days(current, 1),
        IntervalShape::Week => shift_days(current, 7),
        IntervalShape::Month => shift_months(current, 1),
        IntervalShape::Year => shift_months(current, 12),
        IntervalShape::Custom(days) => shift_days(current, days),
    }
}

/// Last millisecond of the day containing `t`.
pub fn end_of_day(t: DateTime<Utc>) -> DateTime<Utc> {
    day_end(t.date_naive())
}

/// First millisecond of the year containing `t`.
pub fn year_floor(t: DateTime<Utc>) -> DateTime<Utc> {
    day_start(first_of_year(t.date_naive().year()))
}

fn week_of(today: NaiveDate) -> Interval {
    let week = today.week(Weekday::Mon);
    span_of(week.first_day(), week.last_day())
}

fn month_of(today: NaiveDate) -> Interval {
    // The current month always exists on the calendar.
    month_span(today.year(), today.month()).expect("current month is a valid month")
}

fn year_of(today: NaiveDate) -> Interval {
    let last = NaiveDate::from_ymd_opt(today.year(), 12, 31).expect("Dec 31 exists in every year");
    span_of(first_of_year(today.year()), last)
}

fn first_of_year(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).expect("Jan 1 exists in every year")
}

fn month_span(year: i32, month: u32) -> Option<Interval> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some(span_of(first, last))
}

fn span_of(first: NaiveDate, last: NaiveDate) -> Interval {
    Interval {
        start: day_start(first),
        end: day_end(last),
    }
}

fn day_start(d: NaiveDate) -> DateTime<Utc> {
    d.and_hms_opt(0, 0, 0).expect("midnight is a valid time").and_utc()
}

fn day_end(d: NaiveDate) -> DateTime<Utc> {
    d.and_hms_milli_opt(23, 59, 59, 999)
        .expect("23:59:59.999 is a valid time")
        .and_utc()
}

fn shift_days(iv: &Interval, days: i64) -> Interval {
    let delta = Duration::days(days);
    Interval {
        start: iv.start - delta,
        end: iv.end - delta,
    }
}

fn shift_months(iv: &Interval, months: u32) -> Interval {
    let step = Months::new(months);
    Interval {
        start: sub_months(iv.start, step),
        end: sub_months(iv.end, step),
    }
}

fn sub_months(t: DateTime<Utc>, step: Months) -> DateTime<Utc> {
    // Day-of-month is clamped by chrono (Mar 31 - 1 month = Feb 29/28),
    // which is exactly the calendar behavior the comparison rule wants.
    t.checked_sub_months(step)
        .expect("timestamps stay well inside chrono's supported range")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ms(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32, milli: u32) -> DateTime<Utc> {
        date(y, m, d)
            .and_hms_milli_opt(h, min, s, milli)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn custom_range_boundary_values() {
        let iv = date_range(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert_eq!(iv.start, ms(2024, 1, 1, 0, 0, 0, 0));
        assert_eq!(iv.end, ms(2024, 1, 31, 23, 59, 59, 999));
        assert!(iv.start < iv.end);
    }

    #[test]
    fn same_day_range_covers_one_day() {
        let iv = date_range(date(2024, 1, 5), date(2024, 1, 5)).unwrap();
        assert_eq!(iv.day_span(), 1);
        assert!(iv.start < iv.end);
    }

    #[test]
    fn previous_month_respects_leap_february() {
        let march = date_range(date(2024, 3, 1), date(2024, 3, 31)).unwrap();
        let previous = previous_interval(&march);
        assert_eq!(previous.start, ms(2024, 2, 1, 0, 0, 0, 0));
        assert_eq!(previous.end, ms(2024, 2, 29, 23, 59, 59, 999));
    }

    #[test]
    fn previous_month_of_mid_month_window() {
        let window = date_range(date(2024, 2, 15), date(2024, 3, 14)).unwrap();
        let previous = previous_interval(&window);
        assert_eq!(previous.start.date_naive(), date(2024, 1, 15));
        assert_eq!(previous.end.date_naive(), date(2024, 2, 14));
    }

    #[test]
    fn previous_year_steps_a_whole_calendar_year() {
        let leap_year = date_range(date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        assert_eq!(leap_year.day_span(), 366);
        let previous = previous_interval(&leap_year);
        assert_eq!(previous.start.date_naive(), date(2023, 1, 1));
        assert_eq!(previous.end.date_naive(), date(2023, 12, 31));
    }

    #[test]
    fn previous_custom_span_lands_flush() {
        let window = date_range(date(2024, 1, 11), date(2024, 1, 20)).unwrap();
        let previous = previous_interval(&window);
        assert_eq!(previous.start.date_naive(), date(2024, 1, 1));
        assert_eq!(previous.end.date_naive(), date(2024, 1, 10));
        // Exactly adjacent, no gap and no overlap.
        assert!(previous.end < window.start);
        assert_eq!(previous.day_span(), window.day_span());
    }

    #[test]
    fn previous_of_single_day_is_the_day_before() {
        let now = ms(2024, 3, 15, 14, 30, 0, 0);
        let today = unit_interval(PeriodUnit::Today, now);
        let yesterday = previous_interval(&today);
        assert_eq!(yesterday.start.date_naive(), date(2024, 3, 14));
        assert_eq!(yesterday.end, ms(2024, 3, 14, 23, 59, 59, 999));
    }

    #[test]
    fn weeks_run_monday_through_sunday() {
        // 2024-03-13 is a Wednesday.
        let now = ms(2024, 3, 13, 9, 0, 0, 0);
        let week = unit_interval(PeriodUnit::ThisWeek, now);
        assert_eq!(week.start.date_naive(), date(2024, 3, 11));
        assert_eq!(week.end.date_naive(), date(2024, 3, 17));

        let last_week = unit_interval(PeriodUnit::LastWeek, now);
        assert_eq!(last_week.start.date_naive(), date(2024, 3, 4));
        assert_eq!(last_week.end.date_naive(), date(2024, 3, 10));
    }

    #[test]
    fn this_month_covers_the_whole_month() {
        let now = ms(2024, 2, 10, 12, 0, 0, 0);
        let month = unit_interval(PeriodUnit::ThisMonth, now);
        assert_eq!(month.start, ms(2024, 2, 1, 0, 0, 0, 0));
        assert_eq!(month.end, ms(2024, 2, 29, 23, 59, 59, 999));
    }

    #[test]
    fn last_month_from_a_31_day_month() {
        let now = ms(2024, 3, 31, 23, 0, 0, 0);
        let last = unit_interval(PeriodUnit::LastMonth, now);
        assert_eq!(last.start, ms(2024, 2, 1, 0, 0, 0, 0));
        assert_eq!(last.end, ms(2024, 2, 29, 23, 59, 59, 999));
    }

    #[test]
    fn this_year_and_last_year() {
        let now = ms(2024, 7, 4, 8, 0, 0, 0);
        let year = unit_interval(PeriodUnit::ThisYear, now);
        assert_eq!(year.start.date_naive(), date(2024, 1, 1));
        assert_eq!(year.end.date_naive(), date(2024, 12, 31));

        let last = unit_interval(PeriodUnit::LastYear, now);
        assert_eq!(last.start.date_naive(), date(2023, 1, 1));
        assert_eq!(last.end.date_naive(), date(2023, 12, 31));
    }

    #[test]
    fn month_literal_interval() {
        let iv = month_interval(2024, 8).unwrap();
        assert_eq!(iv.start, ms(2024, 8, 1, 0, 0, 0, 0));
        assert_eq!(iv.end, ms(2024, 8, 31, 23, 59, 59, 999));
    }

    #[test]
    fn year_floor_and_end_of_day() {
        let t = ms(2024, 6, 15, 13, 45, 12, 345);
        assert_eq!(year_floor(t), ms(2024, 1, 1, 0, 0, 0, 0));
        assert_eq!(end_of_day(t), ms(2024, 6, 15, 23, 59, 59, 999));
    }
}
