//! In-memory reference ledger.
//!
//! One [`MemoryLedger`] owns every table behind a single `RwLock`; the
//! per-domain handle types ([`MemoryAccountStore`] and friends) are thin
//! `Arc` wrappers that implement the store ports against it. A whole-state
//! lock keeps cross-table rules (balance adjustments, delete conflicts,
//! denormalized name upkeep) atomic without ordering concerns.
//!
//! Ids are minted as `<domain prefix><uuid v4 simple>`, which is the shape
//! the resolution fast path recognizes.

use std::sync::Arc;

use async_trait::async_trait;
use bursar_application::ports::clock::Clock;
use bursar_application::ports::directory::UserDirectory;
use bursar_application::ports::stores::{
    AccountStore, ActivityTimeline, BudgetStore, CategoryStore, DebtStore, DomainStore, GoalStore,
    StoreError, TransactionStore,
};
use bursar_domain::core::{EntityDomain, Identifier, UserId};
use bursar_domain::finance::{
    Account, AccountPatch, Budget, Category, CategoryKind, Debt, DebtStatus, Goal, GoalPatch,
    NewAccount, NewBudget, NewCategory, NewDebt, NewGoal, NewTransaction, Transaction, UserRef,
};
use bursar_domain::interval::Interval;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct LedgerState {
    users: Vec<UserRef>,
    accounts: Vec<Account>,
    categories: Vec<Category>,
    budgets: Vec<Budget>,
    debts: Vec<Debt>,
    transactions: Vec<Transaction>,
    goals: Vec<Goal>,
}

/// The shared in-memory store behind every domain handle.
pub struct MemoryLedger {
    state: RwLock<LedgerState>,
    clock: Arc<dyn Clock>,
}

fn mint(domain: EntityDomain) -> Identifier {
    Identifier::new(format!("{}{}", domain.id_prefix(), Uuid::new_v4().simple()))
}

fn require_name(name: &str, field: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::validation(field, "must not be empty"));
    }
    Ok(name.to_string())
}

fn require_positive(amount: f64, field: &str) -> Result<f64, StoreError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(StoreError::validation(field, "must be greater than zero"));
    }
    Ok(amount)
}

impl MemoryLedger {
    pub fn new(clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(MemoryLedger {
            state: RwLock::new(LedgerState::default()),
            clock,
        })
    }

    /// Register a user and hand back their directory entry.
    pub async fn add_user(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> UserRef {
        let user = UserRef {
            id: UserId::new(format!("usr_{}", Uuid::new_v4().simple())),
            name: name.into(),
            email: email.into(),
        };
        self.state.write().await.users.push(user.clone());
        user
    }

    pub fn accounts(self: &Arc<Self>) -> MemoryAccountStore {
        MemoryAccountStore(self.clone())
    }

    pub fn categories(self: &Arc<Self>) -> MemoryCategoryStore {
        MemoryCategoryStore(self.clone())
    }

    pub fn budgets(self: &Arc<Self>) -> MemoryBudgetStore {
        MemoryBudgetStore(self.clone())
    }

    pub fn debts(self: &Arc<Self>) -> MemoryDebtStore {
        MemoryDebtStore(self.clone())
    }

    pub fn transactions(self: &Arc<Self>) -> MemoryTransactionStore {
        MemoryTransactionStore(self.clone())
    }

    pub fn goals(self: &Arc<Self>) -> MemoryGoalStore {
        MemoryGoalStore(self.clone())
    }

    pub fn directory(self: &Arc<Self>) -> MemoryUserDirectory {
        MemoryUserDirectory(self.clone())
    }
}

#[async_trait]
impl ActivityTimeline for MemoryLedger {
    async fn earliest_record(&self, user: &UserId) -> Result<Option<DateTime<Utc>>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .transactions
            .iter()
            .filter(|t| t.user_id == *user)
            .map(|t| t.occurred_at)
            .min())
    }
}

#[derive(Clone)]
pub struct MemoryAccountStore(Arc<MemoryLedger>);

#[async_trait]
impl DomainStore for MemoryAccountStore {
    type Row = Account;

    fn domain(&self) -> EntityDomain {
        EntityDomain::Account
    }

    async fn find_by_fuzzy_key(
        &self,
        user: &UserId,
        text: &str,
    ) -> Result<Vec<Account>, StoreError> {
        let needle = text.to_lowercase();
        let state = self.0.state.read().await;
        Ok(state
            .accounts
            .iter()
            .filter(|a| a.user_id == *user && a.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn find_by_id(
        &self,
        user: &UserId,
        id: &Identifier,
    ) -> Result<Option<Account>, StoreError> {
        let state = self.0.state.read().await;
        Ok(state
            .accounts
            .iter()
            .find(|a| a.id == *id && a.user_id == *user)
            .cloned())
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(&self, user: &UserId, payload: NewAccount) -> Result<Account, StoreError> {
        let name = require_name(&payload.name, "name")?;
        if !payload.opening_balance.is_finite() {
            return Err(StoreError::validation("opening_balance", "must be a finite number"));
        }

        let account = Account {
            id: mint(EntityDomain::Account),
            user_id: user.clone(),
            name,
            kind: payload.kind,
            balance: payload.opening_balance,
            created_at: self.0.clock.now(),
        };
        self.0.state.write().await.accounts.push(account.clone());
        Ok(account)
    }

    async fn update(
        &self,
        user: &UserId,
        id: &Identifier,
        patch: AccountPatch,
    ) -> Result<Account, StoreError> {
        let renamed = match &patch.name {
            Some(name) => Some(require_name(name, "new_name")?),
            None => None,
        };

        let mut state = self.0.state.write().await;
        let state = &mut *state;
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.id == *id && a.user_id == *user)
            .ok_or(StoreError::NotFound(EntityDomain::Account))?;

        if let Some(name) = renamed {
            account.name = name.clone();
            // Keep the denormalized copies on transactions in step.
            for transaction in state
                .transactions
                .iter_mut()
                .filter(|t| t.account_id == *id)
            {
                transaction.account_name = name.clone();
            }
        }
        if let Some(kind) = patch.kind {
            account.kind = kind;
        }
        Ok(account.clone())
    }

    async fn delete(&self, user: &UserId, id: &Identifier) -> Result<Account, StoreError> {
        let mut state = self.0.state.write().await;
        let index = state
            .accounts
            .iter()
            .position(|a| a.id == *id && a.user_id == *user)
            .ok_or(StoreError::NotFound(EntityDomain::Account))?;

        let references = state
            .transactions
            .iter()
            .filter(|t| t.account_id == *id)
            .count();
        if references > 0 {
            return Err(StoreError::Conflict(format!(
                "\"{}\" still has {references} transaction(s) recorded against it; delete those first",
                state.accounts[index].name
            )));
        }
        Ok(state.accounts.remove(index))
    }

    async fn list(&self, user: &UserId) -> Result<Vec<Account>, StoreError> {
        let state = self.0.state.read().await;
        Ok(state
            .accounts
            .iter()
            .filter(|a| a.user_id == *user)
            .cloned()
            .collect())
    }
}

#[derive(Clone)]
pub struct MemoryCategoryStore(Arc<MemoryLedger>);

impl MemoryCategoryStore {
    fn name_taken(state: &LedgerState, user: &UserId, name: &str, except: Option<&Identifier>) -> bool {
        let lowered = name.to_lowercase();
        state.categories.iter().any(|c| {
            c.user_id == *user
                && c.name.to_lowercase() == lowered
                && except.is_none_or(|id| c.id != *id)
        })
    }
}

#[async_trait]
impl DomainStore for MemoryCategoryStore {
    type Row = Category;

    fn domain(&self) -> EntityDomain {
        EntityDomain::Category
    }

    async fn find_by_fuzzy_key(
        &self,
        user: &UserId,
        text: &str,
    ) -> Result<Vec<Category>, StoreError> {
        let needle = text.to_lowercase();
        let state = self.0.state.read().await;
        Ok(state
            .categories
            .iter()
            .filter(|c| c.user_id == *user && c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn find_by_id(
        &self,
        user: &UserId,
        id: &Identifier,
    ) -> Result<Option<Category>, StoreError> {
        let state = self.0.state.read().await;
        Ok(state
            .categories
            .iter()
            .find(|c| c.id == *id && c.user_id == *user)
            .cloned())
    }
}

#[async_trait]
impl CategoryStore for MemoryCategoryStore {
    async fn create(&self, user: &UserId, payload: NewCategory) -> Result<Category, StoreError> {
        let name = require_name(&payload.name, "name")?;

        let mut state = self.0.state.write().await;
        if Self::name_taken(&state, user, &name, None) {
            return Err(StoreError::Conflict(format!(
                "you already have a category named \"{name}\""
            )));
        }

        let category = Category {
            id: mint(EntityDomain::Category),
            user_id: user.clone(),
            name,
            kind: payload.kind,
            created_at: self.0.clock.now(),
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn rename(
        &self,
        user: &UserId,
        id: &Identifier,
        new_name: &str,
    ) -> Result<Category, StoreError> {
        let name = require_name(new_name, "new_name")?;

        let mut state = self.0.state.write().await;
        let state = &mut *state;
        if MemoryCategoryStore::name_taken(state, user, &name, Some(id)) {
            return Err(StoreError::Conflict(format!(
                "you already have a category named \"{name}\""
            )));
        }

        let category = state
            .categories
            .iter_mut()
            .find(|c| c.id == *id && c.user_id == *user)
            .ok_or(StoreError::NotFound(EntityDomain::Category))?;
        category.name = name.clone();

        for budget in state.budgets.iter_mut().filter(|b| b.category_id == *id) {
            budget.category_name = name.clone();
        }
        for transaction in state
            .transactions
            .iter_mut()
            .filter(|t| t.category_id == *id)
        {
            transaction.category_name = name.clone();
        }
        Ok(category.clone())
    }

    async fn delete(&self, user: &UserId, id: &Identifier) -> Result<Category, StoreError> {
        let mut state = self.0.state.write().await;
        let index = state
            .categories
            .iter()
            .position(|c| c.id == *id && c.user_id == *user)
            .ok_or(StoreError::NotFound(EntityDomain::Category))?;

        let references = state
            .transactions
            .iter()
            .filter(|t| t.category_id == *id)
            .count();
        if references > 0 {
            return Err(StoreError::Conflict(format!(
                "\"{}\" still has {references} transaction(s) recorded against it; delete those first",
                state.categories[index].name
            )));
        }

        // A budget capping the category goes with it.
        state.budgets.retain(|b| b.category_id != *id);
        Ok(state.categories.remove(index))
    }

    async fn list(
        &self,
        user: &UserId,
        kind: Option<CategoryKind>,
    ) -> Result<Vec<Category>, StoreError> {
        let state = self.0.state.read().await;
        Ok(state
            .categories
            .iter()
            .filter(|c| c.user_id == *user && kind.is_none_or(|k| c.kind == k))
            .cloned()
            .collect())
    }
}

#[derive(Clone)]
pub struct MemoryBudgetStore(Arc<MemoryLedger>);

#[async_trait]
impl DomainStore for MemoryBudgetStore {
    type Row = Budget;

    fn domain(&self) -> EntityDomain {
        EntityDomain::Budget
    }

    async fn find_by_fuzzy_key(
        &self,
        user: &UserId,
        text: &str,
    ) -> Result<Vec<Budget>, StoreError> {
        let needle = text.to_lowercase();
        let state = self.0.state.read().await;
        Ok(state
            .budgets
            .iter()
            .filter(|b| b.user_id == *user && b.category_name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn find_by_id(
        &self,
        user: &UserId,
        id: &Identifier,
    ) -> Result<Option<Budget>, StoreError> {
        let state = self.0.state.read().await;
        Ok(state
            .budgets
            .iter()
            .find(|b| b.id == *id && b.user_id == *user)
            .cloned())
    }
}

#[async_trait]
impl BudgetStore for MemoryBudgetStore {
    async fn create(&self, user: &UserId, payload: NewBudget) -> Result<Budget, StoreError> {
        require_positive(payload.amount, "amount")?;

        let mut state = self.0.state.write().await;
        let category = state
            .categories
            .iter()
            .find(|c| c.id == payload.category_id && c.user_id == *user)
            .ok_or(StoreError::NotFound(EntityDomain::Category))?;
        if category.kind != CategoryKind::Expense {
            return Err(StoreError::validation(
                "category",
                "budgets only apply to expense categories",
            ));
        }
        if state
            .budgets
            .iter()
            .any(|b| b.category_id == payload.category_id)
        {
            return Err(StoreError::Conflict(format!(
                "\"{}\" already has a budget; change its amount instead",
                category.name
            )));
        }

        let budget = Budget {
            id: mint(EntityDomain::Budget),
            user_id: user.clone(),
            category_id: payload.category_id.clone(),
            category_name: category.name.clone(),
            amount: payload.amount,
            period: payload.period,
            created_at: self.0.clock.now(),
        };
        state.budgets.push(budget.clone());
        Ok(budget)
    }

    async fn set_amount(
        &self,
        user: &UserId,
        id: &Identifier,
        amount: f64,
    ) -> Result<Budget, StoreError> {
        require_positive(amount, "amount")?;

        let mut state = self.0.state.write().await;
        let budget = state
            .budgets
            .iter_mut()
            .find(|b| b.id == *id && b.user_id == *user)
            .ok_or(StoreError::NotFound(EntityDomain::Budget))?;
        budget.amount = amount;
        Ok(budget.clone())
    }

    async fn delete(&self, user: &UserId, id: &Identifier) -> Result<Budget, StoreError> {
        let mut state = self.0.state.write().await;
        let index = state
            .budgets
            .iter()
            .position(|b| b.id == *id && b.user_id == *user)
            .ok_or(StoreError::NotFound(EntityDomain::Budget))?;
        Ok(state.budgets.remove(index))
    }

    async fn list(&self, user: &UserId) -> Result<Vec<Budget>, StoreError> {
        let state = self.0.state.read().await;
        Ok(state
            .budgets
            .iter()
            .filter(|b| b.user_id == *user)
            .cloned()
            .collect())
    }
}

#[derive(Clone)]
pub struct MemoryDebtStore(Arc<MemoryLedger>);

#[async_trait]
impl DomainStore for MemoryDebtStore {
    type Row = Debt;

    fn domain(&self) -> EntityDomain {
        EntityDomain::Debt
    }

    async fn find_by_fuzzy_key(&self, user: &UserId, text: &str) -> Result<Vec<Debt>, StoreError> {
        let needle = text.to_lowercase();
        let state = self.0.state.read().await;
        Ok(state
            .debts
            .iter()
            .filter(|d| {
                d.involves(user)
                    && (d.counterparty_name.to_lowercase().contains(&needle)
                        || d.description.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    async fn find_by_id(
        &self,
        user: &UserId,
        id: &Identifier,
    ) -> Result<Option<Debt>, StoreError> {
        let state = self.0.state.read().await;
        Ok(state
            .debts
            .iter()
            .find(|d| d.id == *id && d.involves(user))
            .cloned())
    }
}

#[async_trait]
impl DebtStore for MemoryDebtStore {
    async fn create(&self, user: &UserId, payload: NewDebt) -> Result<Debt, StoreError> {
        require_positive(payload.amount, "amount")?;
        let description = require_name(&payload.description, "description")?;
        if payload.counterparty_id == *user {
            return Err(StoreError::validation(
                "counterparty",
                "cannot record a debt with yourself",
            ));
        }

        let mut state = self.0.state.write().await;
        let counterparty = state
            .users
            .iter()
            .find(|u| u.id == payload.counterparty_id)
            .ok_or_else(|| StoreError::validation("counterparty", "unknown user"))?;

        let debt = Debt {
            id: mint(EntityDomain::Debt),
            creator_id: user.clone(),
            counterparty_id: counterparty.id.clone(),
            counterparty_name: counterparty.name.clone(),
            direction: payload.direction,
            amount: payload.amount,
            description,
            status: DebtStatus::Pending,
            created_at: self.0.clock.now(),
        };
        state.debts.push(debt.clone());
        Ok(debt)
    }

    async fn update_description(
        &self,
        user: &UserId,
        id: &Identifier,
        description: &str,
    ) -> Result<Debt, StoreError> {
        let description = require_name(description, "description")?;

        let mut state = self.0.state.write().await;
        let debt = state
            .debts
            .iter_mut()
            .find(|d| d.id == *id && d.involves(user))
            .ok_or(StoreError::NotFound(EntityDomain::Debt))?;
        if !debt.is_creator(user) {
            return Err(StoreError::Forbidden(EntityDomain::Debt));
        }
        debt.description = description;
        Ok(debt.clone())
    }

    async fn mark_paid(&self, user: &UserId, id: &Identifier) -> Result<Debt, StoreError> {
        let mut state = self.0.state.write().await;
        let debt = state
            .debts
            .iter_mut()
            .find(|d| d.id == *id && d.involves(user))
            .ok_or(StoreError::NotFound(EntityDomain::Debt))?;
        if debt.status == DebtStatus::Paid {
            return Err(StoreError::Conflict("this debt is already settled".to_string()));
        }
        debt.status = DebtStatus::Paid;
        Ok(debt.clone())
    }

    async fn delete(&self, user: &UserId, id: &Identifier) -> Result<Debt, StoreError> {
        let mut state = self.0.state.write().await;
        let index = state
            .debts
            .iter()
            .position(|d| d.id == *id && d.involves(user))
            .ok_or(StoreError::NotFound(EntityDomain::Debt))?;
        if !state.debts[index].is_creator(user) {
            return Err(StoreError::Forbidden(EntityDomain::Debt));
        }
        Ok(state.debts.remove(index))
    }

    async fn list(
        &self,
        user: &UserId,
        status: Option<DebtStatus>,
    ) -> Result<Vec<Debt>, StoreError> {
        let state = self.0.state.read().await;
        Ok(state
            .debts
            .iter()
            .filter(|d| d.involves(user) && status.is_none_or(|s| d.status == s))
            .cloned()
            .collect())
    }
}

#[derive(Clone)]
pub struct MemoryTransactionStore(Arc<MemoryLedger>);

#[async_trait]
impl DomainStore for MemoryTransactionStore {
    type Row = Transaction;

    fn domain(&self) -> EntityDomain {
        EntityDomain::Transaction
    }

    async fn find_by_fuzzy_key(
        &self,
        user: &UserId,
        text: &str,
    ) -> Result<Vec<Transaction>, StoreError> {
        let needle = text.to_lowercase();
        let state = self.0.state.read().await;
        Ok(state
            .transactions
            .iter()
            .filter(|t| t.user_id == *user && t.note.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn find_by_id(
        &self,
        user: &UserId,
        id: &Identifier,
    ) -> Result<Option<Transaction>, StoreError> {
        let state = self.0.state.read().await;
        Ok(state
            .transactions
            .iter()
            .find(|t| t.id == *id && t.user_id == *user)
            .cloned())
    }
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn record(
        &self,
        user: &UserId,
        payload: NewTransaction,
    ) -> Result<Transaction, StoreError> {
        require_positive(payload.amount, "amount")?;

        let mut state = self.0.state.write().await;
        let state = &mut *state;
        let category = state
            .categories
            .iter()
            .find(|c| c.id == payload.category_id && c.user_id == *user)
            .ok_or(StoreError::NotFound(EntityDomain::Category))?
            .clone();
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.id == payload.account_id && a.user_id == *user)
            .ok_or(StoreError::NotFound(EntityDomain::Account))?;

        match category.kind {
            CategoryKind::Expense => account.balance -= payload.amount,
            CategoryKind::Income => account.balance += payload.amount,
        }

        let now = self.0.clock.now();
        let transaction = Transaction {
            id: mint(EntityDomain::Transaction),
            user_id: user.clone(),
            account_id: account.id.clone(),
            account_name: account.name.clone(),
            category_id: category.id.clone(),
            category_name: category.name.clone(),
            kind: category.kind,
            amount: payload.amount,
            note: payload.note,
            occurred_at: payload.occurred_at.unwrap_or(now),
            created_at: now,
        };
        state.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn delete(&self, user: &UserId, id: &Identifier) -> Result<Transaction, StoreError> {
        let mut state = self.0.state.write().await;
        let state = &mut *state;
        let index = state
            .transactions
            .iter()
            .position(|t| t.id == *id && t.user_id == *user)
            .ok_or(StoreError::NotFound(EntityDomain::Transaction))?;
        let transaction = state.transactions.remove(index);

        // Undo the balance effect; the account may already be gone only if
        // it was deleted, which the conflict rule prevents while rows exist.
        if let Some(account) = state
            .accounts
            .iter_mut()
            .find(|a| a.id == transaction.account_id)
        {
            match transaction.kind {
                CategoryKind::Expense => account.balance += transaction.amount,
                CategoryKind::Income => account.balance -= transaction.amount,
            }
        }
        Ok(transaction)
    }

    async fn list_in_interval(
        &self,
        user: &UserId,
        interval: &Interval,
        account: Option<&Identifier>,
        category: Option<&Identifier>,
    ) -> Result<Vec<Transaction>, StoreError> {
        let state = self.0.state.read().await;
        let mut rows: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|t| {
                t.user_id == *user
                    && interval.contains(t.occurred_at)
                    && account.is_none_or(|a| t.account_id == *a)
                    && category.is_none_or(|c| t.category_id == *c)
            })
            .cloned()
            .collect();
        rows.sort_by_key(|t| std::cmp::Reverse(t.occurred_at));
        Ok(rows)
    }

    async fn total_in_interval(
        &self,
        user: &UserId,
        interval: &Interval,
    ) -> Result<f64, StoreError> {
        let state = self.0.state.read().await;
        Ok(state
            .transactions
            .iter()
            .filter(|t| {
                t.user_id == *user
                    && t.kind == CategoryKind::Expense
                    && interval.contains(t.occurred_at)
            })
            .map(|t| t.amount)
            .sum())
    }
}

#[derive(Clone)]
pub struct MemoryGoalStore(Arc<MemoryLedger>);

#[async_trait]
impl DomainStore for MemoryGoalStore {
    type Row = Goal;

    fn domain(&self) -> EntityDomain {
        EntityDomain::Goal
    }

    async fn find_by_fuzzy_key(&self, user: &UserId, text: &str) -> Result<Vec<Goal>, StoreError> {
        let needle = text.to_lowercase();
        let state = self.0.state.read().await;
        Ok(state
            .goals
            .iter()
            .filter(|g| g.user_id == *user && g.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn find_by_id(
        &self,
        user: &UserId,
        id: &Identifier,
    ) -> Result<Option<Goal>, StoreError> {
        let state = self.0.state.read().await;
        Ok(state
            .goals
            .iter()
            .find(|g| g.id == *id && g.user_id == *user)
            .cloned())
    }
}

#[async_trait]
impl GoalStore for MemoryGoalStore {
    async fn create(&self, user: &UserId, payload: NewGoal) -> Result<Goal, StoreError> {
        let name = require_name(&payload.name, "name")?;
        require_positive(payload.target_amount, "target_amount")?;

        let goal = Goal {
            id: mint(EntityDomain::Goal),
            user_id: user.clone(),
            name,
            target_amount: payload.target_amount,
            saved_amount: 0.0,
            deadline: payload.deadline,
            created_at: self.0.clock.now(),
        };
        self.0.state.write().await.goals.push(goal.clone());
        Ok(goal)
    }

    async fn contribute(
        &self,
        user: &UserId,
        id: &Identifier,
        amount: f64,
    ) -> Result<Goal, StoreError> {
        require_positive(amount, "amount")?;

        let mut state = self.0.state.write().await;
        let goal = state
            .goals
            .iter_mut()
            .find(|g| g.id == *id && g.user_id == *user)
            .ok_or(StoreError::NotFound(EntityDomain::Goal))?;
        goal.saved_amount += amount;
        Ok(goal.clone())
    }

    async fn update(
        &self,
        user: &UserId,
        id: &Identifier,
        patch: GoalPatch,
    ) -> Result<Goal, StoreError> {
        let renamed = match &patch.name {
            Some(name) => Some(require_name(name, "new_name")?),
            None => None,
        };
        if let Some(target) = patch.target_amount {
            require_positive(target, "target_amount")?;
        }

        let mut state = self.0.state.write().await;
        let goal = state
            .goals
            .iter_mut()
            .find(|g| g.id == *id && g.user_id == *user)
            .ok_or(StoreError::NotFound(EntityDomain::Goal))?;
        if let Some(name) = renamed {
            goal.name = name;
        }
        if let Some(target) = patch.target_amount {
            goal.target_amount = target;
        }
        if let Some(deadline) = patch.deadline {
            goal.deadline = Some(deadline);
        }
        Ok(goal.clone())
    }

    async fn delete(&self, user: &UserId, id: &Identifier) -> Result<Goal, StoreError> {
        let mut state = self.0.state.write().await;
        let index = state
            .goals
            .iter()
            .position(|g| g.id == *id && g.user_id == *user)
            .ok_or(StoreError::NotFound(EntityDomain::Goal))?;
        Ok(state.goals.remove(index))
    }

    async fn list(&self, user: &UserId) -> Result<Vec<Goal>, StoreError> {
        let state = self.0.state.read().await;
        Ok(state
            .goals
            .iter()
            .filter(|g| g.user_id == *user)
            .cloned()
            .collect())
    }
}

#[derive(Clone)]
pub struct MemoryUserDirectory(Arc<MemoryLedger>);

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_exact(&self, text: &str) -> Result<Vec<UserRef>, StoreError> {
        let needle = text.to_lowercase();
        let state = self.0.state.read().await;
        Ok(state
            .users
            .iter()
            .filter(|u| u.email.to_lowercase() == needle || u.name.to_lowercase() == needle)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRef>, StoreError> {
        let state = self.0.state.read().await;
        Ok(state.users.iter().find(|u| u.id == *id).cloned())
    }
}
