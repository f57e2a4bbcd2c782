//! Argument conventions shared by every tool set.
//!
//! Schema validation runs before a set is invoked, so these helpers mostly
//! guard value ranges and parse domain enums; the error wording still has
//! to stand on its own for callers that skip the catalog.

use std::str::FromStr;

use bursar_domain::finance::ParseKindError;
use bursar_domain::tool::{ArgumentError, ParamKind, ToolCall, ToolParameter};
use chrono::NaiveDate;

use crate::tools::ToolFailure;

/// Required monetary amount. Zero and negative amounts are rejected; signs
/// are carried by the record kind (expense vs income, lent vs borrowed).
pub(crate) fn positive_amount(call: &ToolCall, key: &str) -> Result<f64, ToolFailure> {
    let value = call.require_f64(key)?;
    if !value.is_finite() || value <= 0.0 {
        return Err(ArgumentError::invalid(key, "amount must be greater than zero").into());
    }
    Ok(value)
}

/// Optional variant of [`positive_amount`].
pub(crate) fn optional_positive_amount(
    call: &ToolCall,
    key: &str,
) -> Result<Option<f64>, ToolFailure> {
    match call.get_f64(key) {
        None => Ok(None),
        Some(value) if value.is_finite() && value > 0.0 => Ok(Some(value)),
        Some(_) => Err(ArgumentError::invalid(key, "amount must be greater than zero").into()),
    }
}

/// Optional number that only has to be finite (opening balances may be
/// negative for credit accounts).
pub(crate) fn finite_number(call: &ToolCall, key: &str) -> Result<Option<f64>, ToolFailure> {
    match call.get_f64(key) {
        None => Ok(None),
        Some(value) if value.is_finite() => Ok(Some(value)),
        Some(_) => Err(ArgumentError::invalid(key, "must be a finite number").into()),
    }
}

/// Optional domain enum (account kind, budget period, ...). Parsing is
/// case-insensitive; the error repeats the accepted spellings.
pub(crate) fn parse_kind<T>(call: &ToolCall, key: &str) -> Result<Option<T>, ToolFailure>
where
    T: FromStr<Err = ParseKindError>,
{
    match call.get_str(key) {
        None => Ok(None),
        Some(text) => match text.parse::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(err) => Err(ArgumentError::invalid(key, err.to_string()).into()),
        },
    }
}

pub(crate) fn require_kind<T>(call: &ToolCall, key: &str) -> Result<T, ToolFailure>
where
    T: FromStr<Err = ParseKindError>,
{
    match parse_kind(call, key)? {
        Some(value) => Ok(value),
        None => Err(ArgumentError::Missing(key.to_string()).into()),
    }
}

/// Optional calendar date in the same `YYYY-MM-DD` shape the period
/// grammar uses for ranges.
pub(crate) fn parse_date_arg(call: &ToolCall, key: &str) -> Result<Option<NaiveDate>, ToolFailure> {
    match call.get_str(key) {
        None => Ok(None),
        Some(text) => match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            Ok(date) => Ok(Some(date)),
            Err(_) => Err(ArgumentError::invalid(
                key,
                format!("could not parse \"{text}\" as a YYYY-MM-DD date"),
            )
            .into()),
        },
    }
}

/// The free-text targeting parameter every protected tool carries.
pub(crate) fn identifier_param(description: impl Into<String>) -> ToolParameter {
    ToolParameter::required("identifier", ParamKind::Text, description)
}

/// The confirmation parameter: absent on the first call, echoed back from
/// the confirmation envelope on the second.
pub(crate) fn confirmed_id_param() -> ToolParameter {
    ToolParameter::optional(
        "confirmed_id",
        ParamKind::Text,
        "Exact id from a prior confirmation envelope; supply it to execute the action",
    )
}

#[cfg(test)]
mod tests {
    use bursar_domain::finance::{AccountKind, BudgetPeriod};
    use serde_json::json;

    use super::*;

    fn call_with(key: &str, value: serde_json::Value) -> ToolCall {
        ToolCall::new("any_tool").with_arg(key, value)
    }

    #[test]
    fn positive_amount_rejects_zero_and_negative() {
        for bad in [json!(0.0), json!(-3.5)] {
            let err = positive_amount(&call_with("amount", bad), "amount").unwrap_err();
            let message = err.into_response();
            let bursar_domain::tool::ToolResponse::Failed { error } = message else {
                panic!("expected failure");
            };
            assert!(error.contains("greater than zero"), "{error}");
        }
    }

    #[test]
    fn positive_amount_requires_presence() {
        let err = positive_amount(&ToolCall::new("any_tool"), "amount").unwrap_err();
        assert!(matches!(
            err,
            ToolFailure::Argument(ArgumentError::Missing(name)) if name == "amount"
        ));
    }

    #[test]
    fn kinds_parse_case_insensitively() {
        let kind: Option<AccountKind> =
            parse_kind(&call_with("kind", json!("SAVINGS")), "kind").unwrap();
        assert_eq!(kind, Some(AccountKind::Savings));

        let period: BudgetPeriod =
            require_kind(&call_with("period", json!("weekly")), "period").unwrap();
        assert_eq!(period, BudgetPeriod::Weekly);
    }

    #[test]
    fn unknown_kind_error_names_the_argument() {
        let err = parse_kind::<AccountKind>(&call_with("kind", json!("offshore")), "kind")
            .unwrap_err();
        let ToolFailure::Argument(argument) = err else {
            panic!("expected argument error");
        };
        let text = argument.to_string();
        assert!(text.contains("kind"), "{text}");
        assert!(text.contains("offshore"), "{text}");
    }

    #[test]
    fn dates_must_be_iso_shaped() {
        let ok = parse_date_arg(&call_with("date", json!("2024-02-29")), "date").unwrap();
        assert_eq!(ok, NaiveDate::from_ymd_opt(2024, 2, 29));

        assert!(parse_date_arg(&call_with("date", json!("29/02/2024")), "date").is_err());
        assert!(parse_date_arg(&call_with("date", json!("2023-02-29")), "date").is_err());
        assert_eq!(parse_date_arg(&ToolCall::new("t"), "date").unwrap(), None);
    }
}
