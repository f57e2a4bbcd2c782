//! The six financial record types the conversational layer operates on.
//!
//! These are read models and creation payloads, not persistence rows: the
//! backing store owns storage and hands these across the port boundary. Each
//! record knows how to render itself for the resolution protocol (one-line
//! `label` for clarification lists, fuller `summary` for confirmation
//! prompts).

mod entities;
mod value_objects;

pub use entities::{
    Account, AccountKind, Budget, BudgetPeriod, Category, CategoryKind, Debt, DebtDirection,
    DebtStatus, Goal, ParseKindError, Transaction, UserRef,
};
pub use value_objects::{
    AccountPatch, GoalPatch, NewAccount, NewBudget, NewCategory, NewDebt, NewGoal, NewTransaction,
};

/// Render an amount the way every user-facing message does.
pub fn format_amount(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${amount:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::format_amount;

    #[test]
    fn amounts_render_with_two_decimals() {
        assert_eq!(format_amount(45.0), "$45.00");
        assert_eq!(format_amount(0.5), "$0.50");
        assert_eq!(format_amount(-12.345), "-$12.35");
    }
}
