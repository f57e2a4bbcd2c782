//! Creation and patch payloads carried from the tool layer into the stores.
//!
//! Denormalized display fields (`accountName`, `categoryName`,
//! `counterpartyName`) are filled in by the store at create time, so payloads
//! only carry identifiers the caller has already resolved.

use chrono::{DateTime, NaiveDate, Utc};

use crate::core::{Identifier, UserId};
use crate::finance::{AccountKind, BudgetPeriod, CategoryKind, DebtDirection};

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub kind: AccountKind,
    pub opening_balance: f64,
}

impl NewAccount {
    pub fn new(name: impl Into<String>) -> Self {
        NewAccount {
            name: name.into(),
            kind: AccountKind::default(),
            opening_balance: 0.0,
        }
    }

    pub fn with_kind(mut self, kind: AccountKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_opening_balance(mut self, balance: f64) -> Self {
        self.opening_balance = balance;
        self
    }
}

/// Partial account update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub kind: Option<AccountKind>,
}

impl AccountPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        AccountPatch {
            name: Some(name.into()),
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: AccountKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.kind.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub kind: CategoryKind,
}

impl NewCategory {
    pub fn new(name: impl Into<String>, kind: CategoryKind) -> Self {
        NewCategory {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewBudget {
    pub category_id: Identifier,
    pub amount: f64,
    pub period: BudgetPeriod,
}

impl NewBudget {
    pub fn new(category_id: Identifier, amount: f64) -> Self {
        NewBudget {
            category_id,
            amount,
            period: BudgetPeriod::default(),
        }
    }

    pub fn with_period(mut self, period: BudgetPeriod) -> Self {
        self.period = period;
        self
    }
}

#[derive(Debug, Clone)]
pub struct NewDebt {
    pub counterparty_id: UserId,
    pub direction: DebtDirection,
    pub amount: f64,
    pub description: String,
}

impl NewDebt {
    pub fn new(
        counterparty_id: UserId,
        direction: DebtDirection,
        amount: f64,
        description: impl Into<String>,
    ) -> Self {
        NewDebt {
            counterparty_id,
            direction,
            amount,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: Identifier,
    pub category_id: Identifier,
    pub amount: f64,
    pub note: String,
    /// Defaults to the store clock's "now" when absent.
    pub occurred_at: Option<DateTime<Utc>>,
}

impl NewTransaction {
    pub fn new(account_id: Identifier, category_id: Identifier, amount: f64) -> Self {
        NewTransaction {
            account_id,
            category_id,
            amount,
            note: String::new(),
            occurred_at: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_occurred_at(mut self, at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(at);
        self
    }
}

#[derive(Debug, Clone)]
pub struct NewGoal {
    pub name: String,
    pub target_amount: f64,
    pub deadline: Option<NaiveDate>,
}

impl NewGoal {
    pub fn new(name: impl Into<String>, target_amount: f64) -> Self {
        NewGoal {
            name: name.into(),
            target_amount,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Partial goal update; `None` fields are left untouched. The saved amount
/// moves only through contributions, never through a patch.
#[derive(Debug, Clone, Default)]
pub struct GoalPatch {
    pub name: Option<String>,
    pub target_amount: Option<f64>,
    pub deadline: Option<NaiveDate>,
}

impl GoalPatch {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_target_amount(mut self, amount: f64) -> Self {
        self.target_amount = Some(amount);
        self
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.target_amount.is_none() && self.deadline.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_defaults() {
        let payload = NewAccount::new("Main Checking");
        assert_eq!(payload.kind, AccountKind::Checking);
        assert_eq!(payload.opening_balance, 0.0);

        let payload = NewAccount::new("Rainy Day")
            .with_kind(AccountKind::Savings)
            .with_opening_balance(500.0);
        assert_eq!(payload.kind, AccountKind::Savings);
        assert_eq!(payload.opening_balance, 500.0);
    }

    #[test]
    fn empty_patches_are_detected() {
        assert!(AccountPatch::default().is_empty());
        assert!(!AccountPatch::rename("Everyday").is_empty());
        assert!(GoalPatch::default().is_empty());
        assert!(!GoalPatch::default().with_target_amount(1200.0).is_empty());
    }

    #[test]
    fn transaction_payload_optionals() {
        let payload = NewTransaction::new(
            Identifier::new("acc_12345678"),
            Identifier::new("cat_87654321"),
            19.5,
        );
        assert!(payload.note.is_empty());
        assert!(payload.occurred_at.is_none());
    }
}
