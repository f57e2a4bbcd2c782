//! Store ports: the capabilities each finance domain exposes to this layer.
//!
//! Every domain service is consumed through two lenses. [`DomainStore`] is
//! the narrow read surface the resolution protocol needs (fuzzy search over
//! the human key plus exact id lookup, both user-scoped). The per-domain
//! subtraits add the mutations the tool sets invoke once a target is
//! resolved and confirmed.
//!
//! Scoping rule: `find_by_id` returns `None` both for absent rows and for
//! rows the user may not see. Callers can therefore not distinguish "not
//! yours" from "does not exist", which is exactly the guarantee the
//! confirmation gate builds on.

use async_trait::async_trait;
use bursar_domain::core::{EntityDomain, Identifier, UserId};
use bursar_domain::finance::{
    Account, AccountPatch, Budget, Category, CategoryKind, Debt, DebtStatus, Goal, GoalPatch,
    NewAccount, NewBudget, NewCategory, NewDebt, NewGoal, NewTransaction, Transaction,
};
use bursar_domain::interval::Interval;
use bursar_domain::resolution::ResolvableRow;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Classified failure from a store mutation or query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(EntityDomain),
    /// The row exists but belongs to another user, or the user's role does
    /// not permit this mutation. The gate collapses this into not-found
    /// before it reaches a response.
    #[error("not authorized for this {0}")]
    Forbidden(EntityDomain),
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },
    #[error("{0}")]
    Conflict(String),
    /// Infrastructure failure; the detail is for logs, never for end users.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Read surface shared by all six domains; what a resolver needs and
/// nothing more.
#[async_trait]
pub trait DomainStore: Send + Sync {
    type Row: ResolvableRow + Clone + Send + Sync + 'static;

    fn domain(&self) -> EntityDomain;

    /// All rows visible to `user` whose human key case-insensitively
    /// contains `text` (substring, not prefix).
    async fn find_by_fuzzy_key(&self, user: &UserId, text: &str)
    -> Result<Vec<Self::Row>, StoreError>;

    /// Exact lookup; `None` when absent or not visible to `user`.
    async fn find_by_id(
        &self,
        user: &UserId,
        id: &Identifier,
    ) -> Result<Option<Self::Row>, StoreError>;
}

/// Human key: account name.
#[async_trait]
pub trait AccountStore: DomainStore<Row = Account> {
    async fn create(&self, user: &UserId, payload: NewAccount) -> Result<Account, StoreError>;
    async fn update(
        &self,
        user: &UserId,
        id: &Identifier,
        patch: AccountPatch,
    ) -> Result<Account, StoreError>;
    /// Refused with `Conflict` while transactions still reference the
    /// account.
    async fn delete(&self, user: &UserId, id: &Identifier) -> Result<Account, StoreError>;
    async fn list(&self, user: &UserId) -> Result<Vec<Account>, StoreError>;
}

/// Human key: category name.
#[async_trait]
pub trait CategoryStore: DomainStore<Row = Category> {
    async fn create(&self, user: &UserId, payload: NewCategory) -> Result<Category, StoreError>;
    async fn rename(
        &self,
        user: &UserId,
        id: &Identifier,
        new_name: &str,
    ) -> Result<Category, StoreError>;
    /// Also removes the category's budget, if any. Refused with `Conflict`
    /// while transactions still reference the category.
    async fn delete(&self, user: &UserId, id: &Identifier) -> Result<Category, StoreError>;
    async fn list(
        &self,
        user: &UserId,
        kind: Option<CategoryKind>,
    ) -> Result<Vec<Category>, StoreError>;
}

/// Human key: the capped category's name. At most one budget per category;
/// a second `create` conflicts.
#[async_trait]
pub trait BudgetStore: DomainStore<Row = Budget> {
    async fn create(&self, user: &UserId, payload: NewBudget) -> Result<Budget, StoreError>;
    async fn set_amount(
        &self,
        user: &UserId,
        id: &Identifier,
        amount: f64,
    ) -> Result<Budget, StoreError>;
    async fn delete(&self, user: &UserId, id: &Identifier) -> Result<Budget, StoreError>;
    async fn list(&self, user: &UserId) -> Result<Vec<Budget>, StoreError>;
}

/// Human key: counterparty name plus description. Visible to creator and
/// counterparty; who may mutate what differs per operation.
#[async_trait]
pub trait DebtStore: DomainStore<Row = Debt> {
    async fn create(&self, user: &UserId, payload: NewDebt) -> Result<Debt, StoreError>;
    /// Creator only; `Forbidden` for the counterparty.
    async fn update_description(
        &self,
        user: &UserId,
        id: &Identifier,
        description: &str,
    ) -> Result<Debt, StoreError>;
    /// Either party may settle. Conflicts when already paid.
    async fn mark_paid(&self, user: &UserId, id: &Identifier) -> Result<Debt, StoreError>;
    /// Creator only; `Forbidden` for the counterparty.
    async fn delete(&self, user: &UserId, id: &Identifier) -> Result<Debt, StoreError>;
    async fn list(&self, user: &UserId, status: Option<DebtStatus>)
    -> Result<Vec<Debt>, StoreError>;
}

/// Human key: the free-text note.
#[async_trait]
pub trait TransactionStore: DomainStore<Row = Transaction> {
    /// Records the movement and adjusts the account balance (expenses
    /// subtract, income adds).
    async fn record(&self, user: &UserId, payload: NewTransaction)
    -> Result<Transaction, StoreError>;
    /// Removes the row and reverses its balance adjustment.
    async fn delete(&self, user: &UserId, id: &Identifier) -> Result<Transaction, StoreError>;
    async fn list_in_interval(
        &self,
        user: &UserId,
        interval: &Interval,
        account: Option<&Identifier>,
        category: Option<&Identifier>,
    ) -> Result<Vec<Transaction>, StoreError>;
    /// Sum of expense amounts inside `interval`.
    async fn total_in_interval(&self, user: &UserId, interval: &Interval)
    -> Result<f64, StoreError>;
}

/// Human key: goal name.
#[async_trait]
pub trait GoalStore: DomainStore<Row = Goal> {
    async fn create(&self, user: &UserId, payload: NewGoal) -> Result<Goal, StoreError>;
    /// Adds `amount` to the saved total.
    async fn contribute(
        &self,
        user: &UserId,
        id: &Identifier,
        amount: f64,
    ) -> Result<Goal, StoreError>;
    async fn update(
        &self,
        user: &UserId,
        id: &Identifier,
        patch: GoalPatch,
    ) -> Result<Goal, StoreError>;
    async fn delete(&self, user: &UserId, id: &Identifier) -> Result<Goal, StoreError>;
    async fn list(&self, user: &UserId) -> Result<Vec<Goal>, StoreError>;
}

/// Where a user's recorded history begins; drives the "all" period.
#[async_trait]
pub trait ActivityTimeline: Send + Sync {
    /// Timestamp of the user's earliest transaction, `None` when nothing is
    /// recorded yet.
    async fn earliest_record(&self, user: &UserId) -> Result<Option<DateTime<Utc>>, StoreError>;
}
