//! Budget tools: create, list, set amount, delete.
//!
//! Budgets cap one category each. Creation resolves the category by free
//! text first, so "set a budget for groceries" works without ids.

use std::sync::Arc;

use async_trait::async_trait;
use bursar_domain::core::UserId;
use bursar_domain::finance::{BudgetPeriod, Category, NewBudget, format_amount};
use bursar_domain::tool::{
    ActionRisk, ParamKind, ToolCall, ToolDefinition, ToolParameter, ToolResponse,
};
use tracing::info;

use crate::gate::ActionGate;
use crate::ports::stores::{BudgetStore, DomainStore};
use crate::resolver::EntityResolver;
use crate::tools::args::{self, confirmed_id_param, identifier_param};
use crate::tools::{
    Resolved, ToolFailure, ToolOutcome, ToolSet, count, identify_or_reply, resolve_or_reply,
    to_data,
};

pub struct BudgetToolSet {
    store: Arc<dyn BudgetStore>,
    categories: EntityResolver<dyn DomainStore<Row = Category>>,
    gate: ActionGate<dyn BudgetStore>,
}

impl BudgetToolSet {
    /// `categories` only needs lookup capability, so any category store
    /// coerces.
    pub fn new(
        store: Arc<dyn BudgetStore>,
        categories: Arc<dyn DomainStore<Row = Category>>,
    ) -> Self {
        BudgetToolSet {
            gate: ActionGate::new(store.clone()),
            categories: EntityResolver::new(categories),
            store,
        }
    }

    pub fn with_clarify_cap(mut self, cap: usize) -> Self {
        self.gate = self.gate.with_clarify_cap(cap);
        self.categories = self.categories.with_clarify_cap(cap);
        self
    }

    async fn create(&self, user: &UserId, call: &ToolCall) -> ToolOutcome {
        let target = call.require_str("category")?;
        let amount = args::positive_amount(call, "amount")?;
        let period = args::parse_kind::<BudgetPeriod>(call, "period")?.unwrap_or_default();

        let category = match resolve_or_reply(&self.categories, user, target).await? {
            Resolved::Row(row) => row,
            Resolved::Reply(response) => return Ok(response),
        };

        let payload = NewBudget::new(category.id.clone(), amount).with_period(period);
        let budget = self.store.create(user, payload).await?;
        info!(id = %budget.id, category = %budget.category_id, "budget created");

        Ok(ToolResponse::completed_with_data(
            format!(
                "Set a {} budget of {} for \"{}\".",
                budget.period,
                format_amount(budget.amount),
                budget.category_name
            ),
            to_data(&budget)?,
        ))
    }

    async fn list(&self, user: &UserId) -> ToolOutcome {
        let budgets = self.store.list(user).await?;
        let message = if budgets.is_empty() {
            "You have no budgets yet.".to_string()
        } else {
            format!("You have {}.", count(budgets.len(), "budget", "budgets"))
        };
        Ok(ToolResponse::completed_with_data(message, to_data(&budgets)?))
    }

    async fn set_amount(&self, user: &UserId, call: &ToolCall) -> ToolOutcome {
        let target = call.require_str("identifier")?;
        let amount = args::positive_amount(call, "amount")?;

        let Some(confirmed) = call.get_str("confirmed_id") else {
            return identify_or_reply(&self.gate, user, target, |summary| {
                format!("change {summary} to {}", format_amount(amount))
            })
            .await;
        };

        let store = self.store.clone();
        let owner = user.clone();
        let updated = self
            .gate
            .execute(user, confirmed, move |row| async move {
                store.set_amount(&owner, &row.id, amount).await
            })
            .await?;

        Ok(ToolResponse::completed_with_data(
            format!(
                "Updated the budget for \"{}\" to {}.",
                updated.category_name,
                format_amount(updated.amount)
            ),
            to_data(&updated)?,
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
        info!(id = %deleted.id, "budget deleted");

        Ok(ToolResponse::completed(format!(
            "Deleted the budget for \"{}\".",
            deleted.category_name
        )))
    }
}

#[async_trait]
impl ToolSet for BudgetToolSet {
    fn name(&self) -> &'static str {
        "budgets"
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition::new(
                "create_budget",
                "Set a spending budget for a category",
                ActionRisk::Write,
            )
            .with_parameter(ToolParameter::required(
                "category",
                ParamKind::Text,
                "Category to cap: its name, part of it, or its id",
            ))
            .with_parameter(ToolParameter::required(
                "amount",
                ParamKind::Number,
                "Budget ceiling; must be positive",
            ))
            .with_parameter(
                ToolParameter::optional("period", ParamKind::Text, "Budget period; defaults to monthly")
                    .with_choices(["weekly", "monthly", "yearly"]),
            ),
            ToolDefinition::new(
                "list_budgets",
                "List every budget with its category, amount and period",
                ActionRisk::Read,
            ),
            ToolDefinition::new(
                "set_budget_amount",
                "Change the amount of an existing budget",
                ActionRisk::Protected,
            )
            .with_parameter(identifier_param(
                "Budget to change: the budgeted category's name, part of it, or the budget id",
            ))
            .with_parameter(ToolParameter::required(
                "amount",
                ParamKind::Number,
                "New ceiling; must be positive",
            ))
            .with_parameter(confirmed_id_param()),
            ToolDefinition::new(
                "delete_budget",
                "Remove a budget (the category itself is kept)",
                ActionRisk::Protected,
            )
            .with_parameter(identifier_param(
                "Budget to remove: the budgeted category's name, part of it, or the budget id",
            ))
            .with_parameter(confirmed_id_param()),
        ]
    }

    async fn invoke(&self, user: &UserId, call: &ToolCall) -> ToolResponse {
        let result = match call.tool_name.as_str() {
            "create_budget" => self.create(user, call).await,
            "list_budgets" => self.list(user).await,
            "set_budget_amount" => self.set_amount(user, call).await,
            "delete_budget" => self.delete(user, call).await,
            other => Err(ToolFailure::Message(format!("Unknown tool \"{other}\""))),
        };
        result.unwrap_or_else(ToolFailure::into_response)
    }
}
