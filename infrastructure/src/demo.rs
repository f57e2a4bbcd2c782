//! Seeded demo ledger and catalog wiring.
//!
//! The demo ledger gives the conversational layer something realistic to
//! chew on: two accounts that both match "main", two open debts that both
//! match "loan", spending in the current and previous month, and a goal
//! mid-way to its target. [`build_catalog`] wires every tool set against
//! one [`MemoryLedger`].

use std::sync::Arc;

use bursar_application::ports::clock::Clock;
use bursar_application::ports::stores::{
    AccountStore, BudgetStore, CategoryStore, DebtStore, GoalStore, StoreError,
    TransactionStore,
};
use bursar_application::tools::{
    AccountToolSet, BudgetToolSet, CategoryToolSet, DebtToolSet, GoalToolSet, ToolCatalog,
    ToolSet, TransactionToolSet,
};
use bursar_application::IntervalResolver;
use bursar_domain::finance::{
    AccountKind, CategoryKind, DebtDirection, NewAccount, NewBudget, NewCategory, NewDebt,
    NewGoal, NewTransaction, UserRef,
};
use bursar_domain::interval::{previous_interval, unit_interval, PeriodUnit};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::store::MemoryLedger;

/// The people seeded into the demo ledger.
pub struct DemoUsers {
    /// The user the demo session acts as.
    pub sam: UserRef,
    pub jordan: UserRef,
    pub riley: UserRef,
}

/// Populate a fresh ledger with the demo data set.
///
/// `now` anchors the transaction history so that "this month" and
/// "last month" always have something in them.
pub async fn seed_ledger(
    ledger: &Arc<MemoryLedger>,
    now: DateTime<Utc>,
) -> Result<DemoUsers, StoreError> {
    let sam = ledger.add_user("Sam Okafor", "sam@example.com").await;
    let jordan = ledger.add_user("Jordan Reyes", "jordan@example.com").await;
    let riley = ledger.add_user("Riley Chen", "riley@example.com").await;

    let accounts = ledger.accounts();
    let checking = accounts
        .create(
            &sam.id,
            NewAccount::new("Main Checking").with_opening_balance(1200.0),
        )
        .await?;
    accounts
        .create(
            &sam.id,
            NewAccount::new("Main Savings")
                .with_kind(AccountKind::Savings)
                .with_opening_balance(4500.0),
        )
        .await?;
    accounts
        .create(
            &sam.id,
            NewAccount::new("Travel Cash")
                .with_kind(AccountKind::Cash)
                .with_opening_balance(300.0),
        )
        .await?;

    let categories = ledger.categories();
    let groceries = categories
        .create(&sam.id, NewCategory::new("Groceries", CategoryKind::Expense))
        .await?;
    let rent = categories
        .create(&sam.id, NewCategory::new("Rent", CategoryKind::Expense))
        .await?;
    let eating_out = categories
        .create(&sam.id, NewCategory::new("Eating Out", CategoryKind::Expense))
        .await?;
    let salary = categories
        .create(&sam.id, NewCategory::new("Salary", CategoryKind::Income))
        .await?;

    let budgets = ledger.budgets();
    budgets
        .create(&sam.id, NewBudget::new(groceries.id.clone(), 400.0))
        .await?;
    budgets
        .create(&sam.id, NewBudget::new(eating_out.id.clone(), 150.0))
        .await?;

    let this_month = unit_interval(PeriodUnit::ThisMonth, now);
    let last_month = previous_interval(&this_month);

    let transactions = ledger.transactions();
    transactions
        .record(
            &sam.id,
            NewTransaction::new(checking.id.clone(), rent.id.clone(), 950.0)
                .with_note("march rent")
                .with_occurred_at(this_month.start + Duration::days(1)),
        )
        .await?;
    transactions
        .record(
            &sam.id,
            NewTransaction::new(checking.id.clone(), groceries.id.clone(), 82.45)
                .with_note("weekly shop")
                .with_occurred_at(this_month.start + Duration::days(2)),
        )
        .await?;
    transactions
        .record(
            &sam.id,
            NewTransaction::new(checking.id.clone(), eating_out.id.clone(), 34.20)
                .with_note("ramen night")
                .with_occurred_at(this_month.start + Duration::days(3)),
        )
        .await?;
    transactions
        .record(
            &sam.id,
            NewTransaction::new(checking.id.clone(), salary.id.clone(), 3200.0)
                .with_note("payday")
                .with_occurred_at(last_month.start + Duration::days(1)),
        )
        .await?;
    transactions
        .record(
            &sam.id,
            NewTransaction::new(checking.id.clone(), rent.id.clone(), 950.0)
                .with_note("february rent")
                .with_occurred_at(last_month.start + Duration::days(2)),
        )
        .await?;
    transactions
        .record(
            &sam.id,
            NewTransaction::new(checking.id.clone(), groceries.id.clone(), 76.10)
                .with_note("monthly stock-up")
                .with_occurred_at(last_month.start + Duration::days(5)),
        )
        .await?;

    let goals = ledger.goals();
    let emergency = goals
        .create(&sam.id, NewGoal::new("Emergency Fund", 5000.0))
        .await?;
    goals.contribute(&sam.id, &emergency.id, 1250.0).await?;
    let trip_deadline = NaiveDate::from_ymd_opt(now.year() + 1, 4, 1)
        .expect("April the 1st is a valid date");
    goals
        .create(
            &sam.id,
            NewGoal::new("Japan Trip", 3000.0).with_deadline(trip_deadline),
        )
        .await?;

    let debts = ledger.debts();
    debts
        .create(
            &sam.id,
            NewDebt::new(
                jordan.id.clone(),
                DebtDirection::Lent,
                120.0,
                "car repair loan",
            ),
        )
        .await?;
    debts
        .create(
            &sam.id,
            NewDebt::new(
                jordan.id.clone(),
                DebtDirection::Borrowed,
                60.0,
                "concert ticket loan",
            ),
        )
        .await?;
    let lunch = debts
        .create(
            &sam.id,
            NewDebt::new(jordan.id.clone(), DebtDirection::Lent, 45.0, "lunch"),
        )
        .await?;
    debts.mark_paid(&sam.id, &lunch.id).await?;

    Ok(DemoUsers { sam, jordan, riley })
}

/// Wire every tool set against one ledger and return the catalog.
pub fn build_catalog(
    ledger: &Arc<MemoryLedger>,
    clock: Arc<dyn Clock>,
    clarify_cap: usize,
) -> ToolCatalog {
    let accounts = Arc::new(ledger.accounts());
    let categories = Arc::new(ledger.categories());
    let intervals = IntervalResolver::new(clock.clone(), ledger.clone());

    let sets: Vec<Arc<dyn ToolSet>> = vec![
        Arc::new(AccountToolSet::new(accounts.clone()).with_clarify_cap(clarify_cap)),
        Arc::new(CategoryToolSet::new(categories.clone()).with_clarify_cap(clarify_cap)),
        Arc::new(
            BudgetToolSet::new(Arc::new(ledger.budgets()), categories.clone())
                .with_clarify_cap(clarify_cap),
        ),
        Arc::new(
            DebtToolSet::new(Arc::new(ledger.debts()), Arc::new(ledger.directory()))
                .with_clarify_cap(clarify_cap),
        ),
        Arc::new(
            TransactionToolSet::new(
                Arc::new(ledger.transactions()),
                accounts,
                categories,
                intervals,
            )
            .with_clarify_cap(clarify_cap),
        ),
        Arc::new(GoalToolSet::new(Arc::new(ledger.goals())).with_clarify_cap(clarify_cap)),
    ];
    ToolCatalog::new(sets, clock)
}
