//! Account tools: create, list, rename, delete.

use std::sync::Arc;

use async_trait::async_trait;
use bursar_domain::core::UserId;
use bursar_domain::finance::{AccountKind, AccountPatch, NewAccount, format_amount};
use bursar_domain::tool::{
    ActionRisk, ParamKind, ToolCall, ToolDefinition, ToolParameter, ToolResponse,
};
use tracing::info;

use crate::gate::ActionGate;
use crate::ports::stores::AccountStore;
use crate::tools::args::{self, confirmed_id_param, identifier_param};
use crate::tools::{ToolFailure, ToolOutcome, ToolSet, count, identify_or_reply, to_data};

pub struct AccountToolSet {
    store: Arc<dyn AccountStore>,
    gate: ActionGate<dyn AccountStore>,
}

impl AccountToolSet {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        AccountToolSet {
            gate: ActionGate::new(store.clone()),
            store,
        }
    }

    pub fn with_clarify_cap(mut self, cap: usize) -> Self {
        self.gate = self.gate.with_clarify_cap(cap);
        self
    }

    async fn create(&self, user: &UserId, call: &ToolCall) -> ToolOutcome {
        let name = call.require_str("name")?;
        let kind = args::parse_kind::<AccountKind>(call, "kind")?.unwrap_or_default();
        let opening = args::finite_number(call, "opening_balance")?.unwrap_or(0.0);

        let payload = NewAccount::new(name)
            .with_kind(kind)
            .with_opening_balance(opening);
        let account = self.store.create(user, payload).await?;
        info!(id = %account.id, "account created");

        Ok(ToolResponse::completed_with_data(
            format!(
                "Created {} account \"{}\" with a balance of {}.",
                account.kind,
                account.name,
                format_amount(account.balance)
            ),
            to_data(&account)?,
        ))
    }

    async fn list(&self, user: &UserId) -> ToolOutcome {
        let accounts = self.store.list(user).await?;
        let message = if accounts.is_empty() {
            "You have no accounts yet.".to_string()
        } else {
            let total: f64 = accounts.iter().map(|a| a.balance).sum();
            format!(
                "You have {} with a combined balance of {}.",
                count(accounts.len(), "account", "accounts"),
                format_amount(total)
            )
        };
        Ok(ToolResponse::completed_with_data(message, to_data(&accounts)?))
    }

    async fn rename(&self, user: &UserId, call: &ToolCall) -> ToolOutcome {
        let target = call.require_str("identifier")?;
        let new_name = call.require_str("new_name")?.to_string();

        let Some(confirmed) = call.get_str("confirmed_id") else {
            return identify_or_reply(&self.gate, user, target, |summary| {
                format!("rename {summary} to \"{new_name}\"")
            })
            .await;
        };

        let store = self.store.clone();
        let owner = user.clone();
        let updated = self
            .gate
            .execute(user, confirmed, move |row| async move {
                store
                    .update(&owner, &row.id, AccountPatch::rename(new_name))
                    .await
            })
            .await?;

        Ok(ToolResponse::completed_with_data(
            format!("Renamed the account to \"{}\".", updated.name),
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
        info!(id = %deleted.id, "account deleted");

        Ok(ToolResponse::completed(format!(
            "Deleted account \"{}\".",
            deleted.name
        )))
    }
}

#[async_trait]
impl ToolSet for AccountToolSet {
    fn name(&self) -> &'static str {
        "accounts"
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition::new(
                "create_account",
                "Create an account for tracking money (bank account, cash, credit card)",
                ActionRisk::Write,
            )
            .with_parameter(ToolParameter::required(
                "name",
                ParamKind::Text,
                "Display name for the account",
            ))
            .with_parameter(
                ToolParameter::optional("kind", ParamKind::Text, "Kind of account; defaults to checking")
                    .with_choices(["checking", "savings", "cash", "credit", "investment"]),
            )
            .with_parameter(ToolParameter::optional(
                "opening_balance",
                ParamKind::Number,
                "Starting balance; defaults to 0",
            )),
            ToolDefinition::new(
                "list_accounts",
                "List every account with its kind and balance",
                ActionRisk::Read,
            ),
            ToolDefinition::new("rename_account", "Rename an existing account", ActionRisk::Protected)
                .with_parameter(identifier_param(
                    "Account to rename: its name, part of it, or its id",
                ))
                .with_parameter(ToolParameter::required(
                    "new_name",
                    ParamKind::Text,
                    "New display name",
                ))
                .with_parameter(confirmed_id_param()),
            ToolDefinition::new(
                "delete_account",
                "Delete an account permanently",
                ActionRisk::Protected,
            )
            .with_parameter(identifier_param(
                "Account to delete: its name, part of it, or its id",
            ))
            .with_parameter(confirmed_id_param()),
        ]
    }

    async fn invoke(&self, user: &UserId, call: &ToolCall) -> ToolResponse {
        let result = match call.tool_name.as_str() {
            "create_account" => self.create(user, call).await,
            "list_accounts" => self.list(user).await,
            "rename_account" => self.rename(user, call).await,
            "delete_account" => self.delete(user, call).await,
            other => Err(ToolFailure::Message(format!("Unknown tool \"{other}\""))),
        };
        result.unwrap_or_else(ToolFailure::into_response)
    }
}
