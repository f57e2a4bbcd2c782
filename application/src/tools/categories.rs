//! Category tools: create, list, rename, delete.
//!
//! Deleting a category also drops its budget; the store refuses the delete
//! while transactions still reference the category.

use std::sync::Arc;

use async_trait::async_trait;
use bursar_domain::core::UserId;
use bursar_domain::finance::{CategoryKind, NewCategory};
use bursar_domain::tool::{
    ActionRisk, ParamKind, ToolCall, ToolDefinition, ToolParameter, ToolResponse,
};
use tracing::info;

use crate::gate::ActionGate;
use crate::ports::stores::CategoryStore;
use crate::tools::args::{self, confirmed_id_param, identifier_param};
use crate::tools::{ToolFailure, ToolOutcome, ToolSet, count, identify_or_reply, to_data};

pub struct CategoryToolSet {
    store: Arc<dyn CategoryStore>,
    gate: ActionGate<dyn CategoryStore>,
}

impl CategoryToolSet {
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        CategoryToolSet {
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
        let kind = args::require_kind::<CategoryKind>(call, "kind")?;

        let category = self.store.create(user, NewCategory::new(name, kind)).await?;
        info!(id = %category.id, "category created");

        Ok(ToolResponse::completed_with_data(
            format!("Created {} category \"{}\".", category.kind, category.name),
            to_data(&category)?,
        ))
    }

    async fn list(&self, user: &UserId, call: &ToolCall) -> ToolOutcome {
        let kind = args::parse_kind::<CategoryKind>(call, "kind")?;
        let categories = self.store.list(user, kind).await?;

        let message = if categories.is_empty() {
            match kind {
                Some(kind) => format!("You have no {kind} categories yet."),
                None => "You have no categories yet.".to_string(),
            }
        } else {
            let noun = match kind {
                Some(kind) => (format!("{kind} category"), format!("{kind} categories")),
                None => ("category".to_string(), "categories".to_string()),
            };
            format!("You have {}.", count(categories.len(), &noun.0, &noun.1))
        };
        Ok(ToolResponse::completed_with_data(message, to_data(&categories)?))
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
                store.rename(&owner, &row.id, &new_name).await
            })
            .await?;

        Ok(ToolResponse::completed_with_data(
            format!("Renamed the category to \"{}\".", updated.name),
            to_data(&updated)?,
        ))
    }

    async fn delete(&self, user: &UserId, call: &ToolCall) -> ToolOutcome {
        let target = call.require_str("identifier")?;

        let Some(confirmed) = call.get_str("confirmed_id") else {
            return identify_or_reply(&self.gate, user, target, |summary| {
                format!("delete {summary}, along with its budget if it has one")
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
        info!(id = %deleted.id, "category deleted");

        Ok(ToolResponse::completed(format!(
            "Deleted category \"{}\".",
            deleted.name
        )))
    }
}

#[async_trait]
impl ToolSet for CategoryToolSet {
    fn name(&self) -> &'static str {
        "categories"
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition::new(
                "create_category",
                "Create a category for classifying transactions",
                ActionRisk::Write,
            )
            .with_parameter(ToolParameter::required(
                "name",
                ParamKind::Text,
                "Display name for the category",
            ))
            .with_parameter(
                ToolParameter::required("kind", ParamKind::Text, "Whether the category tracks income or expenses")
                    .with_choices(["income", "expense"]),
            ),
            ToolDefinition::new(
                "list_categories",
                "List categories, optionally only income or only expense ones",
                ActionRisk::Read,
            )
            .with_parameter(
                ToolParameter::optional("kind", ParamKind::Text, "Restrict to one kind")
                    .with_choices(["income", "expense"]),
            ),
            ToolDefinition::new(
                "rename_category",
                "Rename an existing category",
                ActionRisk::Protected,
            )
            .with_parameter(identifier_param(
                "Category to rename: its name, part of it, or its id",
            ))
            .with_parameter(ToolParameter::required(
                "new_name",
                ParamKind::Text,
                "New display name",
            ))
            .with_parameter(confirmed_id_param()),
            ToolDefinition::new(
                "delete_category",
                "Delete a category permanently, along with its budget if it has one",
                ActionRisk::Protected,
            )
            .with_parameter(identifier_param(
                "Category to delete: its name, part of it, or its id",
            ))
            .with_parameter(confirmed_id_param()),
        ]
    }

    async fn invoke(&self, user: &UserId, call: &ToolCall) -> ToolResponse {
        let result = match call.tool_name.as_str() {
            "create_category" => self.create(user, call).await,
            "list_categories" => self.list(user, call).await,
            "rename_category" => self.rename(user, call).await,
            "delete_category" => self.delete(user, call).await,
            other => Err(ToolFailure::Message(format!("Unknown tool \"{other}\""))),
        };
        result.unwrap_or_else(ToolFailure::into_response)
    }
}
