//! Transaction tools: record, list, spending summary, delete.
//!
//! Everything here is period-aware: list and summary take the free-form
//! period grammar, and the summary compares the resolved interval against
//! its preceding one.

use std::sync::Arc;

use async_trait::async_trait;
use bursar_domain::core::UserId;
use bursar_domain::finance::{Account, Category, CategoryKind, NewTransaction, format_amount};
use bursar_domain::interval::date_range;
use bursar_domain::tool::{
    ActionRisk, ParamKind, ToolCall, ToolDefinition, ToolParameter, ToolResponse,
};
use serde_json::json;
use tracing::info;

use crate::gate::ActionGate;
use crate::intervals::IntervalResolver;
use crate::ports::stores::{DomainStore, TransactionStore};
use crate::resolver::EntityResolver;
use crate::tools::args::{self, confirmed_id_param, identifier_param};
use crate::tools::{
    Resolved, ToolFailure, ToolOutcome, ToolSet, count, identify_or_reply, resolve_or_reply,
    to_data,
};

/// Totals within half a cent count as equal.
const AMOUNT_EPSILON: f64 = 0.005;

pub struct TransactionToolSet {
    store: Arc<dyn TransactionStore>,
    accounts: EntityResolver<dyn DomainStore<Row = Account>>,
    categories: EntityResolver<dyn DomainStore<Row = Category>>,
    intervals: IntervalResolver,
    gate: ActionGate<dyn TransactionStore>,
}

impl TransactionToolSet {
    pub fn new(
        store: Arc<dyn TransactionStore>,
        accounts: Arc<dyn DomainStore<Row = Account>>,
        categories: Arc<dyn DomainStore<Row = Category>>,
        intervals: IntervalResolver,
    ) -> Self {
        TransactionToolSet {
            gate: ActionGate::new(store.clone()),
            accounts: EntityResolver::new(accounts),
            categories: EntityResolver::new(categories),
            intervals,
            store,
        }
    }

    pub fn with_clarify_cap(mut self, cap: usize) -> Self {
        self.gate = self.gate.with_clarify_cap(cap);
        self.accounts = self.accounts.with_clarify_cap(cap);
        self.categories = self.categories.with_clarify_cap(cap);
        self
    }

    async fn record(&self, user: &UserId, call: &ToolCall) -> ToolOutcome {
        let account_text = call.require_str("account")?;
        let category_text = call.require_str("category")?;
        let amount = args::positive_amount(call, "amount")?;
        let note = call.get_str("note").unwrap_or_default().to_string();
        let date = args::parse_date_arg(call, "date")?;

        let account = match resolve_or_reply(&self.accounts, user, account_text).await? {
            Resolved::Row(row) => row,
            Resolved::Reply(response) => return Ok(response),
        };
        let category = match resolve_or_reply(&self.categories, user, category_text).await? {
            Resolved::Row(row) => row,
            Resolved::Reply(response) => return Ok(response),
        };

        let mut payload =
            NewTransaction::new(account.id.clone(), category.id.clone(), amount).with_note(note);
        if let Some(date) = date {
            // Single-day floor; same bound the period grammar uses.
            payload = payload.with_occurred_at(date_range(date, date)?.start);
        }

        let transaction = self.store.record(user, payload).await?;
        info!(id = %transaction.id, account = %transaction.account_id, "transaction recorded");

        let message = match transaction.kind {
            CategoryKind::Expense => format!(
                "Recorded an expense of {} in \"{}\" from \"{}\".",
                format_amount(transaction.amount),
                transaction.category_name,
                transaction.account_name
            ),
            CategoryKind::Income => format!(
                "Recorded income of {} in \"{}\" to \"{}\".",
                format_amount(transaction.amount),
                transaction.category_name,
                transaction.account_name
            ),
        };
        Ok(ToolResponse::completed_with_data(message, to_data(&transaction)?))
    }

    async fn list(&self, user: &UserId, call: &ToolCall) -> ToolOutcome {
        let interval = self.intervals.resolve(user, call.get_str("period")).await?;

        let account = match call.get_str("account") {
            None => None,
            Some(text) => match resolve_or_reply(&self.accounts, user, text).await? {
                Resolved::Row(row) => Some(row),
                Resolved::Reply(response) => return Ok(response),
            },
        };
        let category = match call.get_str("category") {
            None => None,
            Some(text) => match resolve_or_reply(&self.categories, user, text).await? {
                Resolved::Row(row) => Some(row),
                Resolved::Reply(response) => return Ok(response),
            },
        };

        let rows = self
            .store
            .list_in_interval(
                user,
                &interval,
                account.as_ref().map(|a| &a.id),
                category.as_ref().map(|c| &c.id),
            )
            .await?;

        let span = format!(
            "between {} and {}",
            interval.start.date_naive(),
            interval.end.date_naive()
        );
        let message = if rows.is_empty() {
            format!("No transactions {span}.")
        } else {
            format!(
                "Found {} {span}.",
                count(rows.len(), "transaction", "transactions")
            )
        };
        Ok(ToolResponse::completed_with_data(message, to_data(&rows)?))
    }

    async fn summary(&self, user: &UserId, call: &ToolCall) -> ToolOutcome {
        let interval = self.intervals.resolve(user, call.get_str("period")).await?;
        let previous = self.intervals.previous(&interval);

        let total = self.store.total_in_interval(user, &interval).await?;
        let previous_total = self.store.total_in_interval(user, &previous).await?;

        let mut message = format!(
            "You spent {} between {} and {}.",
            format_amount(total),
            interval.start.date_naive(),
            interval.end.date_naive()
        );
        let delta = total - previous_total;
        if previous_total > AMOUNT_EPSILON {
            if delta.abs() <= AMOUNT_EPSILON {
                message.push_str(" That matches the previous period exactly.");
            } else {
                let percent = (delta / previous_total * 100.0).abs();
                let word = if delta > 0.0 { "more" } else { "less" };
                message.push_str(&format!(
                    " That is {percent:.0}% {word} than the previous period ({}).",
                    format_amount(previous_total)
                ));
            }
        } else if total > AMOUNT_EPSILON {
            message.push_str(" The previous period had no recorded spending.");
        }

        Ok(ToolResponse::completed_with_data(
            message,
            json!({
                "total": total,
                "previousTotal": previous_total,
                "interval": interval,
                "previousInterval": previous,
            }),
        ))
    }

    async fn delete(&self, user: &UserId, call: &ToolCall) -> ToolOutcome {
        let target = call.require_str("identifier")?;

        let Some(confirmed) = call.get_str("confirmed_id") else {
            return identify_or_reply(&self.gate, user, target, |summary| {
                format!("delete {summary}")
            })
            .await;
        };

        let store = self.store.clone();
        let owner = user.clone();
        let deleted = self
            .gate
            .execute(user, confirmed, move |row| async move {
                store.delete(&owner, &row.id).await
            })
            .await?;
        info!(id = %deleted.id, "transaction deleted");

        Ok(ToolResponse::completed(
            "Deleted the transaction and restored the account balance.",
        ))
    }
}

#[async_trait]
impl ToolSet for TransactionToolSet {
    fn name(&self) -> &'static str {
        "transactions"
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        let period_help =
            "Period to cover: \"thisWeek\", \"lastMonth\", \"2024-06\", \"2024-01-01,2024-03-31\", \
             or \"all\"; defaults to this month";
        vec![
            ToolDefinition::new(
                "record_transaction",
                "Record an expense or income movement on an account",
                ActionRisk::Write,
            )
            .with_parameter(ToolParameter::required(
                "account",
                ParamKind::Text,
                "Account the money moved through: its name, part of it, or its id",
            ))
            .with_parameter(ToolParameter::required(
                "category",
                ParamKind::Text,
                "Category to classify under; its kind decides expense vs income",
            ))
            .with_parameter(ToolParameter::required(
                "amount",
                ParamKind::Number,
                "Amount moved; must be positive",
            ))
            .with_parameter(ToolParameter::optional(
                "note",
                ParamKind::Text,
                "Free-text note; used later to find the transaction",
            ))
            .with_parameter(ToolParameter::optional(
                "date",
                ParamKind::Date,
                "Day it happened (YYYY-MM-DD); defaults to today",
            )),
            ToolDefinition::new(
                "list_transactions",
                "List transactions in a period, optionally narrowed to one account or category",
                ActionRisk::Read,
            )
            .with_parameter(ToolParameter::optional("period", ParamKind::Period, period_help))
            .with_parameter(ToolParameter::optional(
                "account",
                ParamKind::Text,
                "Only this account: its name, part of it, or its id",
            ))
            .with_parameter(ToolParameter::optional(
                "category",
                ParamKind::Text,
                "Only this category: its name, part of it, or its id",
            )),
            ToolDefinition::new(
                "spending_summary",
                "Total spending in a period, compared with the period before it",
                ActionRisk::Read,
            )
            .with_parameter(ToolParameter::optional("period", ParamKind::Period, period_help)),
            ToolDefinition::new(
                "delete_transaction",
                "Delete a transaction and undo its effect on the account balance",
                ActionRisk::Protected,
            )
            .with_parameter(identifier_param(
                "Transaction to delete: words from its note, or its id",
            ))
            .with_parameter(confirmed_id_param()),
        ]
    }

    async fn invoke(&self, user: &UserId, call: &ToolCall) -> ToolResponse {
        let result = match call.tool_name.as_str() {
            "record_transaction" => self.record(user, call).await,
            "list_transactions" => self.list(user, call).await,
            "spending_summary" => self.summary(user, call).await,
            "delete_transaction" => self.delete(user, call).await,
            other => Err(ToolFailure::Message(format!("Unknown tool \"{other}\""))),
        };
        result.unwrap_or_else(ToolFailure::into_response)
    }
}
