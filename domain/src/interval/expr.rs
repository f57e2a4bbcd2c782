//! Parsing of raw duration expressions.
//!
//! The raw string is parsed exactly once, here, into a tagged [`PeriodExpr`];
//! consumers never re-inspect the original text.

use chrono::NaiveDate;

use super::value_objects::IntervalError;

/// A named calendar unit relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodUnit {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    ThisYear,
    LastYear,
}

/// One parsed duration expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodExpr {
    /// A keyword like `today` or `lastMonth`.
    Unit(PeriodUnit),
    /// A literal `YYYY-MM` month.
    Month { year: i32, month: u32 },
    /// An explicit `YYYY-MM-DD,YYYY-MM-DD` range.
    Range { start: NaiveDate, end: NaiveDate },
    /// `all`: from the earliest recorded activity to today.
    AllTime,
}

impl PeriodExpr {
    /// Parse a raw expression, in priority order: explicit range, keyword,
    /// month literal. An absent or unrecognized expression falls back to
    /// `thisMonth` so a vague request still produces a sensible range; only
    /// an expression that *commits* to the range form (contains a comma) can
    /// fail, because silently ignoring half a range would filter on the
    /// wrong data.
    pub fn parse(raw: Option<&str>) -> Result<PeriodExpr, IntervalError> {
        let Some(raw) = raw else {
            return Ok(PeriodExpr::Unit(PeriodUnit::ThisMonth));
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(PeriodExpr::Unit(PeriodUnit::ThisMonth));
        }

        if let Some((lhs, rhs)) = trimmed.split_once(',') {
            let start = parse_date(lhs)?;
            let end = parse_date(rhs)?;
            if start > end {
                return Err(IntervalError::StartAfterEnd { start, end });
            }
            return Ok(PeriodExpr::Range { start, end });
        }

        if let Some(unit) = parse_keyword(trimmed) {
            return Ok(unit);
        }

        if let Some((year, month)) = parse_month_literal(trimmed) {
            return Ok(PeriodExpr::Month { year, month });
        }

        Ok(PeriodExpr::Unit(PeriodUnit::ThisMonth))
    }
}

fn parse_date(part: &str) -> Result<NaiveDate, IntervalError> {
    let part = part.trim();
    NaiveDate::parse_from_str(part, "%Y-%m-%d")
        .map_err(|_| IntervalError::UnparsableDate(part.to_string()))
}

/// Keywords are matched ignoring case, underscores and internal whitespace,
/// so `thisWeek`, `this_week` and `last month` all land on the same unit.
fn parse_keyword(text: &str) -> Option<PeriodExpr> {
    let folded: String = text
        .chars()
        .filter(|c| *c != '_' && !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let unit = match folded.as_str() {
        "today" => PeriodUnit::Today,
        "yesterday" => PeriodUnit::Yesterday,
        "thisweek" => PeriodUnit::ThisWeek,
        "lastweek" => PeriodUnit::LastWeek,
        "thismonth" => PeriodUnit::ThisMonth,
        "lastmonth" => PeriodUnit::LastMonth,
        "thisyear" => PeriodUnit::ThisYear,
        "lastyear" => PeriodUnit::LastYear,
        "all" => return Some(PeriodExpr::AllTime),
        _ => return None,
    };
    Some(PeriodExpr::Unit(unit))
}

fn parse_month_literal(text: &str) -> Option<(i32, u32)> {
    let (y, m) = text.split_once('-')?;
    let year: i32 = y.parse().ok()?;
    let month: u32 = m.parse().ok()?;
    if y.len() == 4 && (1..=12).contains(&month) {
        Some((year, month))
    } else {
        None
    }
}
