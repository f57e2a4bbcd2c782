//! Record types for the six finance domains, plus the user directory row.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::core::{Identifier, UserId, truncate_label};
use crate::finance::format_amount;
use crate::resolution::ResolvableRow;

/// Width at which free text (notes, descriptions) is cut inside labels.
const LABEL_TEXT_WIDTH: usize = 40;

/// Failure parsing one of the kind enums from user-supplied text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {what} `{value}` (expected one of: {expected})")]
pub struct ParseKindError {
    pub what: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl ParseKindError {
    fn new(what: &'static str, value: &str, expected: &'static str) -> Self {
        ParseKindError {
            what,
            value: value.to_string(),
            expected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    #[default]
    Checking,
    Savings,
    Cash,
    Credit,
    Investment,
}

impl FromStr for AccountKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "checking" => Ok(AccountKind::Checking),
            "savings" => Ok(AccountKind::Savings),
            "cash" => Ok(AccountKind::Cash),
            "credit" => Ok(AccountKind::Credit),
            "investment" => Ok(AccountKind::Investment),
            _ => Err(ParseKindError::new(
                "account kind",
                s,
                "checking, savings, cash, credit, investment",
            )),
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccountKind::Checking => "checking",
            AccountKind::Savings => "savings",
            AccountKind::Cash => "cash",
            AccountKind::Credit => "credit",
            AccountKind::Investment => "investment",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Income,
    #[default]
    Expense,
}

impl FromStr for CategoryKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(CategoryKind::Income),
            "expense" => Ok(CategoryKind::Expense),
            _ => Err(ParseKindError::new("category kind", s, "income, expense")),
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl FromStr for BudgetPeriod {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(BudgetPeriod::Weekly),
            "monthly" => Ok(BudgetPeriod::Monthly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            _ => Err(ParseKindError::new(
                "budget period",
                s,
                "weekly, monthly, yearly",
            )),
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
        })
    }
}

/// Direction of a debt from its creator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtDirection {
    /// The creator lent money to the counterparty.
    Lent,
    /// The creator borrowed money from the counterparty.
    Borrowed,
}

impl DebtDirection {
    /// Phrase joining the amount to the counterparty name.
    pub fn phrase(&self) -> &'static str {
        match self {
            DebtDirection::Lent => "lent to",
            DebtDirection::Borrowed => "borrowed from",
        }
    }
}

impl FromStr for DebtDirection {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lent" => Ok(DebtDirection::Lent),
            "borrowed" => Ok(DebtDirection::Borrowed),
            _ => Err(ParseKindError::new("debt direction", s, "lent, borrowed")),
        }
    }
}

impl fmt::Display for DebtDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DebtDirection::Lent => "lent",
            DebtDirection::Borrowed => "borrowed",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtStatus {
    Pending,
    Paid,
}

impl FromStr for DebtStatus {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(DebtStatus::Pending),
            "paid" => Ok(DebtStatus::Paid),
            _ => Err(ParseKindError::new("debt status", s, "pending, paid")),
        }
    }
}

impl fmt::Display for DebtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DebtStatus::Pending => "pending",
            DebtStatus::Paid => "paid",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Identifier,
    pub user_id: UserId,
    pub name: String,
    pub kind: AccountKind,
    pub balance: f64,
    pub created_at: DateTime<Utc>,
}

impl ResolvableRow for Account {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn label(&self) -> String {
        format!("{} ({})", self.name, self.kind)
    }

    fn summary(&self) -> String {
        format!(
            "account \"{}\" ({}, balance {})",
            self.name,
            self.kind,
            format_amount(self.balance)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Identifier,
    pub user_id: UserId,
    pub name: String,
    pub kind: CategoryKind,
    pub created_at: DateTime<Utc>,
}

impl ResolvableRow for Category {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn label(&self) -> String {
        format!("{} ({})", self.name, self.kind)
    }

    fn summary(&self) -> String {
        format!("category \"{}\" ({})", self.name, self.kind)
    }
}

/// A spending cap for one category. The human key is the category name:
/// "my groceries budget" resolves through the category it caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: Identifier,
    pub user_id: UserId,
    pub category_id: Identifier,
    pub category_name: String,
    pub amount: f64,
    pub period: BudgetPeriod,
    pub created_at: DateTime<Utc>,
}

impl ResolvableRow for Budget {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn label(&self) -> String {
        format!(
            "{} budget - {} {}",
            self.category_name,
            format_amount(self.amount),
            self.period
        )
    }

    fn summary(&self) -> String {
        format!(
            "the {} budget of {} for \"{}\"",
            self.period,
            format_amount(self.amount),
            self.category_name
        )
    }
}

/// Money owed between the creator and one counterparty.
///
/// Both parties can see and resolve the record; what each may do with it is
/// decided at the mutation (creator edits and deletes, either side settles).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: Identifier,
    pub creator_id: UserId,
    pub counterparty_id: UserId,
    pub counterparty_name: String,
    pub direction: DebtDirection,
    pub amount: f64,
    pub description: String,
    pub status: DebtStatus,
    pub created_at: DateTime<Utc>,
}

impl Debt {
    pub fn involves(&self, user: &UserId) -> bool {
        self.creator_id == *user || self.counterparty_id == *user
    }

    pub fn is_creator(&self, user: &UserId) -> bool {
        self.creator_id == *user
    }
}

impl ResolvableRow for Debt {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn label(&self) -> String {
        let mut label = format!(
            "{} {} - {}",
            self.direction.phrase(),
            self.counterparty_name,
            format_amount(self.amount)
        );
        if !self.description.trim().is_empty() {
            label.push_str(&format!(
                " ({})",
                truncate_label(self.description.trim(), LABEL_TEXT_WIDTH)
            ));
        }
        label
    }

    fn summary(&self) -> String {
        let mut summary = format!(
            "{} debt of {} {} {}",
            self.status,
            format_amount(self.amount),
            self.direction.phrase(),
            self.counterparty_name
        );
        if !self.description.trim().is_empty() {
            summary.push_str(&format!(": \"{}\"", self.description.trim()));
        }
        summary
    }
}

/// One recorded movement of money. The human key is the free-text note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Identifier,
    pub user_id: UserId,
    pub account_id: Identifier,
    pub account_name: String,
    pub category_id: Identifier,
    pub category_name: String,
    pub kind: CategoryKind,
    pub amount: f64,
    pub note: String,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ResolvableRow for Transaction {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn label(&self) -> String {
        let what = if self.note.trim().is_empty() {
            self.category_name.clone()
        } else {
            truncate_label(self.note.trim(), LABEL_TEXT_WIDTH)
        };
        format!(
            "{} - {} on {}",
            what,
            format_amount(self.amount),
            self.occurred_at.date_naive()
        )
    }

    fn summary(&self) -> String {
        let mut summary = format!(
            "{} of {} on {} ({}, {})",
            self.kind,
            format_amount(self.amount),
            self.occurred_at.date_naive(),
            self.category_name,
            self.account_name
        );
        if !self.note.trim().is_empty() {
            summary.push_str(&format!(": \"{}\"", self.note.trim()));
        }
        summary
    }
}

/// A savings target the user contributes toward over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Identifier,
    pub user_id: UserId,
    pub name: String,
    pub target_amount: f64,
    pub saved_amount: f64,
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn is_reached(&self) -> bool {
        self.saved_amount >= self.target_amount
    }
}

impl ResolvableRow for Goal {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn label(&self) -> String {
        format!(
            "{} - {} of {}",
            self.name,
            format_amount(self.saved_amount),
            format_amount(self.target_amount)
        )
    }

    fn summary(&self) -> String {
        let mut summary = format!(
            "goal \"{}\" ({} saved of {} target",
            self.name,
            format_amount(self.saved_amount),
            format_amount(self.target_amount)
        );
        match self.deadline {
            Some(deadline) => summary.push_str(&format!(", due {deadline})")),
            None => summary.push(')'),
        }
        summary
    }
}

/// A directory row for involved-user lookup (debt counterparties).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl UserRef {
    /// Disambiguating label: two users can share a name, emails are unique.
    pub fn label(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap()
    }

    fn sample_debt() -> Debt {
        Debt {
            id: Identifier::new("debt_0a1b2c3d"),
            creator_id: UserId::new("usr_aaaa1111"),
            counterparty_id: UserId::new("usr_bbbb2222"),
            counterparty_name: "Jordan Reyes".to_string(),
            direction: DebtDirection::Lent,
            amount: 45.0,
            description: "lunch loan".to_string(),
            status: DebtStatus::Pending,
            created_at: created(),
        }
    }

    #[test]
    fn debt_label_names_counterparty_amount_and_description() {
        let label = sample_debt().label();
        assert_eq!(label, "lent to Jordan Reyes - $45.00 (lunch loan)");
    }

    #[test]
    fn debt_summary_reads_as_a_sentence() {
        let summary = sample_debt().summary();
        assert_eq!(
            summary,
            "pending debt of $45.00 lent to Jordan Reyes: \"lunch loan\""
        );
    }

    #[test]
    fn debt_roles() {
        let debt = sample_debt();
        assert!(debt.involves(&UserId::new("usr_aaaa1111")));
        assert!(debt.involves(&UserId::new("usr_bbbb2222")));
        assert!(!debt.involves(&UserId::new("usr_cccc3333")));
        assert!(debt.is_creator(&UserId::new("usr_aaaa1111")));
        assert!(!debt.is_creator(&UserId::new("usr_bbbb2222")));
    }

    #[test]
    fn transaction_label_falls_back_to_category() {
        let txn = Transaction {
            id: Identifier::new("txn_00aa11bb"),
            user_id: UserId::new("usr_aaaa1111"),
            account_id: Identifier::new("acc_12345678"),
            account_name: "Main Checking".to_string(),
            category_id: Identifier::new("cat_87654321"),
            category_name: "Groceries".to_string(),
            kind: CategoryKind::Expense,
            amount: 12.99,
            note: String::new(),
            occurred_at: created(),
            created_at: created(),
        };
        assert_eq!(txn.label(), "Groceries - $12.99 on 2024-05-02");
    }

    #[test]
    fn kinds_parse_case_insensitively() {
        assert_eq!("Savings".parse::<AccountKind>().unwrap(), AccountKind::Savings);
        assert_eq!("INCOME".parse::<CategoryKind>().unwrap(), CategoryKind::Income);
        assert_eq!("Lent".parse::<DebtDirection>().unwrap(), DebtDirection::Lent);
        assert!("weekly ".parse::<BudgetPeriod>().is_ok());
        let err = "cheque".parse::<AccountKind>().unwrap_err();
        assert!(err.to_string().contains("account kind"));
        assert!(err.to_string().contains("checking"));
    }

    #[test]
    fn goal_progress() {
        let goal = Goal {
            id: Identifier::new("goal_aa00bb11"),
            user_id: UserId::new("usr_aaaa1111"),
            name: "Vacation Fund".to_string(),
            target_amount: 2000.0,
            saved_amount: 350.0,
            deadline: NaiveDate::from_ymd_opt(2025, 6, 1),
            created_at: created(),
        };
        assert!(!goal.is_reached());
        assert_eq!(goal.label(), "Vacation Fund - $350.00 of $2000.00");
        assert!(goal.summary().contains("due 2025-06-01"));
    }
}
