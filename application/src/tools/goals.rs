//! Goal tools: create, list, contribute, update, delete.
//!
//! Contributions are additive and unguarded (wrong ones are corrected by
//! updating the goal); structural changes and deletion go through the gate.

use std::sync::Arc;

use async_trait::async_trait;
use bursar_domain::core::UserId;
use bursar_domain::finance::{GoalPatch, NewGoal, format_amount};
use bursar_domain::tool::{
    ActionRisk, ParamKind, ToolCall, ToolDefinition, ToolParameter, ToolResponse,
};
use tracing::info;

use crate::gate::ActionGate;
use crate::ports::stores::GoalStore;
use crate::resolver::EntityResolver;
use crate::tools::args::{self, confirmed_id_param, identifier_param};
use crate::tools::{
    Resolved, ToolFailure, ToolOutcome, ToolSet, count, identify_or_reply, resolve_or_reply,
    to_data,
};

pub struct GoalToolSet {
    store: Arc<dyn GoalStore>,
    resolver: EntityResolver<dyn GoalStore>,
    gate: ActionGate<dyn GoalStore>,
}

impl GoalToolSet {
    pub fn new(store: Arc<dyn GoalStore>) -> Self {
        GoalToolSet {
            gate: ActionGate::new(store.clone()),
            resolver: EntityResolver::new(store.clone()),
            store,
        }
    }

    pub fn with_clarify_cap(mut self, cap: usize) -> Self {
        self.gate = self.gate.with_clarify_cap(cap);
        self.resolver = self.resolver.with_clarify_cap(cap);
        self
    }

    async fn create(&self, user: &UserId, call: &ToolCall) -> ToolOutcome {
        let name = call.require_str("name")?;
        let target = args::positive_amount(call, "target_amount")?;
        let deadline = args::parse_date_arg(call, "deadline")?;

        let mut payload = NewGoal::new(name, target);
        if let Some(deadline) = deadline {
            payload = payload.with_deadline(deadline);
        }
        let goal = self.store.create(user, payload).await?;
        info!(id = %goal.id, "goal created");

        let mut message = format!(
            "Created goal \"{}\" with a target of {}",
            goal.name,
            format_amount(goal.target_amount)
        );
        match goal.deadline {
            Some(deadline) => message.push_str(&format!(", due by {deadline}.")),
            None => message.push('.'),
        }
        Ok(ToolResponse::completed_with_data(message, to_data(&goal)?))
    }

    async fn list(&self, user: &UserId) -> ToolOutcome {
        let goals = self.store.list(user).await?;
        let message = if goals.is_empty() {
            "You have no savings goals yet.".to_string()
        } else {
            let reached = goals.iter().filter(|g| g.is_reached()).count();
            match reached {
                0 => format!("You have {}.", count(goals.len(), "savings goal", "savings goals")),
                1 => format!(
                    "You have {}; 1 is fully funded.",
                    count(goals.len(), "savings goal", "savings goals")
                ),
                n => format!(
                    "You have {}; {n} are fully funded.",
                    count(goals.len(), "savings goal", "savings goals")
                ),
            }
        };
        Ok(ToolResponse::completed_with_data(message, to_data(&goals)?))
    }

    async fn contribute(&self, user: &UserId, call: &ToolCall) -> ToolOutcome {
        let target = call.require_str("identifier")?;
        let amount = args::positive_amount(call, "amount")?;

        let goal = match resolve_or_reply(&self.resolver, user, target).await? {
            Resolved::Row(row) => row,
            Resolved::Reply(response) => return Ok(response),
        };

        let updated = self.store.contribute(user, &goal.id, amount).await?;
        info!(id = %updated.id, "goal contribution recorded");

        let mut message = format!(
            "Added {} to \"{}\" ({} of {} saved).",
            format_amount(amount),
            updated.name,
            format_amount(updated.saved_amount),
            format_amount(updated.target_amount)
        );
        if updated.is_reached() {
            message.push_str(" Goal reached!");
        }
        Ok(ToolResponse::completed_with_data(message, to_data(&updated)?))
    }

    async fn update(&self, user: &UserId, call: &ToolCall) -> ToolOutcome {
        let target = call.require_str("identifier")?;

        let mut patch = GoalPatch::default();
        if let Some(name) = call.get_str("new_name") {
            patch = patch.with_name(name);
        }
        if let Some(amount) = args::optional_positive_amount(call, "target_amount")? {
            patch = patch.with_target_amount(amount);
        }
        if let Some(deadline) = args::parse_date_arg(call, "deadline")? {
            patch = patch.with_deadline(deadline);
        }
        if patch.is_empty() {
            return Ok(ToolResponse::failed(
                "Nothing to update: provide new_name, target_amount, or deadline.",
            ));
        }

        let Some(confirmed) = call.get_str("confirmed_id") else {
            let changes = describe_changes(&patch);
            return identify_or_reply(&self.gate, user, target, |summary| {
                format!("update {summary}: {changes}")
            })
            .await;
        };

        let store = self.store.clone();
        let owner = user.clone();
        let updated = self
            .gate
            .execute(user, confirmed, move |row| async move {
                store.update(&owner, &row.id, patch).await
            })
            .await?;

        Ok(ToolResponse::completed_with_data(
            format!("Updated goal \"{}\".", updated.name),
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
        info!(id = %deleted.id, "goal deleted");

        Ok(ToolResponse::completed(format!(
            "Deleted goal \"{}\".",
            deleted.name
        )))
    }
}

/// Spell out the patch so the confirmation names the concrete change, not
/// just the target.
fn describe_changes(patch: &GoalPatch) -> String {
    let mut parts = Vec::new();
    if let Some(name) = &patch.name {
        parts.push(format!("rename it to \"{name}\""));
    }
    if let Some(target) = patch.target_amount {
        parts.push(format!("set the target to {}", format_amount(target)));
    }
    if let Some(deadline) = patch.deadline {
        parts.push(format!("move the deadline to {deadline}"));
    }
    parts.join(" and ")
}

#[async_trait]
impl ToolSet for GoalToolSet {
    fn name(&self) -> &'static str {
        "goals"
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition::new(
                "create_goal",
                "Create a savings goal with a target amount",
                ActionRisk::Write,
            )
            .with_parameter(ToolParameter::required(
                "name",
                ParamKind::Text,
                "Display name for the goal",
            ))
            .with_parameter(ToolParameter::required(
                "target_amount",
                ParamKind::Number,
                "Amount to save toward; must be positive",
            ))
            .with_parameter(ToolParameter::optional(
                "deadline",
                ParamKind::Date,
                "Day to reach it by (YYYY-MM-DD)",
            )),
            ToolDefinition::new(
                "list_goals",
                "List every savings goal with its progress",
                ActionRisk::Read,
            ),
            ToolDefinition::new(
                "contribute_to_goal",
                "Add an amount to a goal's saved total",
                ActionRisk::Write,
            )
            .with_parameter(identifier_param(
                "Goal to fund: its name, part of it, or its id",
            ))
            .with_parameter(ToolParameter::required(
                "amount",
                ParamKind::Number,
                "Amount to add; must be positive",
            )),
            ToolDefinition::new(
                "update_goal",
                "Change a goal's name, target amount, or deadline",
                ActionRisk::Protected,
            )
            .with_parameter(identifier_param(
                "Goal to change: its name, part of it, or its id",
            ))
            .with_parameter(ToolParameter::optional("new_name", ParamKind::Text, "New display name"))
            .with_parameter(ToolParameter::optional(
                "target_amount",
                ParamKind::Number,
                "New target; must be positive",
            ))
            .with_parameter(ToolParameter::optional(
                "deadline",
                ParamKind::Date,
                "New deadline (YYYY-MM-DD)",
            ))
            .with_parameter(confirmed_id_param()),
            ToolDefinition::new(
                "delete_goal",
                "Delete a savings goal permanently",
                ActionRisk::Protected,
            )
            .with_parameter(identifier_param(
                "Goal to delete: its name, part of it, or its id",
            ))
            .with_parameter(confirmed_id_param()),
        ]
    }

    async fn invoke(&self, user: &UserId, call: &ToolCall) -> ToolResponse {
        let result = match call.tool_name.as_str() {
            "create_goal" => self.create(user, call).await,
            "list_goals" => self.list(user).await,
            "contribute_to_goal" => self.contribute(user, call).await,
            "update_goal" => self.update(user, call).await,
            "delete_goal" => self.delete(user, call).await,
            other => Err(ToolFailure::Message(format!("Unknown tool \"{other}\""))),
        };
        result.unwrap_or_else(ToolFailure::into_response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bursar_domain::core::{EntityDomain, Identifier};
    use bursar_domain::finance::Goal;
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::ports::stores::{DomainStore, StoreError};

    struct MemGoals {
        rows: Mutex<Vec<Goal>>,
    }

    fn owner() -> UserId {
        UserId::new("usr_0000aaaa")
    }

    fn goal(id: &str, name: &str, target: f64, saved: f64) -> Goal {
        Goal {
            id: Identifier::new(id),
            user_id: owner(),
            name: name.to_string(),
            target_amount: target,
            saved_amount: saved,
            deadline: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[async_trait]
    impl DomainStore for MemGoals {
        type Row = Goal;

        fn domain(&self) -> EntityDomain {
            EntityDomain::Goal
        }

        async fn find_by_fuzzy_key(
            &self,
            user: &UserId,
            text: &str,
        ) -> Result<Vec<Goal>, StoreError> {
            let needle = text.to_lowercase();
            Ok(self
                .rows
                .lock()
                .unwrap()
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
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|g| g.id == *id && g.user_id == *user)
                .cloned())
        }
    }

    #[async_trait]
    impl GoalStore for MemGoals {
        async fn create(&self, user: &UserId, payload: NewGoal) -> Result<Goal, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let created = Goal {
                id: Identifier::new(format!("goal_{:08x}", rows.len() + 1)),
                user_id: user.clone(),
                name: payload.name,
                target_amount: payload.target_amount,
                saved_amount: 0.0,
                deadline: payload.deadline,
                created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            };
            rows.push(created.clone());
            Ok(created)
        }

        async fn contribute(
            &self,
            user: &UserId,
            id: &Identifier,
            amount: f64,
        ) -> Result<Goal, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|g| g.id == *id && g.user_id == *user)
                .ok_or(StoreError::NotFound(EntityDomain::Goal))?;
            row.saved_amount += amount;
            Ok(row.clone())
        }

        async fn update(
            &self,
            user: &UserId,
            id: &Identifier,
            patch: GoalPatch,
        ) -> Result<Goal, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|g| g.id == *id && g.user_id == *user)
                .ok_or(StoreError::NotFound(EntityDomain::Goal))?;
            if let Some(name) = patch.name {
                row.name = name;
            }
            if let Some(target) = patch.target_amount {
                row.target_amount = target;
            }
            if let Some(deadline) = patch.deadline {
                row.deadline = Some(deadline);
            }
            Ok(row.clone())
        }

        async fn delete(&self, user: &UserId, id: &Identifier) -> Result<Goal, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let index = rows
                .iter()
                .position(|g| g.id == *id && g.user_id == *user)
                .ok_or(StoreError::NotFound(EntityDomain::Goal))?;
            Ok(rows.remove(index))
        }

        async fn list(&self, user: &UserId) -> Result<Vec<Goal>, StoreError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|g| g.user_id == *user)
                .cloned()
                .collect())
        }
    }

    fn set_with(rows: Vec<Goal>) -> (GoalToolSet, Arc<MemGoals>) {
        let store = Arc::new(MemGoals {
            rows: Mutex::new(rows),
        });
        (GoalToolSet::new(store.clone()), store)
    }

    #[tokio::test]
    async fn contribution_reports_progress_and_celebrates_completion() {
        let (set, _) = set_with(vec![goal("goal_00000001", "Vacation Fund", 100.0, 80.0)]);

        let response = set
            .invoke(
                &owner(),
                &ToolCall::new("contribute_to_goal")
                    .with_arg("identifier", json!("vacation"))
                    .with_arg("amount", json!(25.0)),
            )
            .await;

        let ToolResponse::Completed { message, .. } = response else {
            panic!("expected completion");
        };
        assert!(message.contains("$105.00 of $100.00"), "{message}");
        assert!(message.contains("Goal reached!"), "{message}");
    }

    #[tokio::test]
    async fn update_with_no_changes_is_rejected_before_identification() {
        let (set, _) = set_with(vec![goal("goal_00000001", "Vacation Fund", 100.0, 0.0)]);

        let response = set
            .invoke(
                &owner(),
                &ToolCall::new("update_goal").with_arg("identifier", json!("vacation")),
            )
            .await;

        let ToolResponse::Failed { error } = response else {
            panic!("expected failure");
        };
        assert!(error.contains("Nothing to update"), "{error}");
    }

    #[tokio::test]
    async fn update_confirmation_names_the_requested_changes() {
        let (set, _) = set_with(vec![goal("goal_00000001", "Vacation Fund", 100.0, 0.0)]);

        let response = set
            .invoke(
                &owner(),
                &ToolCall::new("update_goal")
                    .with_arg("identifier", json!("vacation"))
                    .with_arg("new_name", json!("Big Trip"))
                    .with_arg("target_amount", json!(250.0)),
            )
            .await;

        let ToolResponse::ConfirmationNeeded { id, message, .. } = response else {
            panic!("expected confirmation");
        };
        assert_eq!(id, "goal_00000001");
        assert!(message.contains("rename it to \"Big Trip\""), "{message}");
        assert!(message.contains("set the target to $250.00"), "{message}");
    }

    #[tokio::test]
    async fn update_applies_the_patch_after_confirmation() {
        let (set, store) = set_with(vec![goal("goal_00000001", "Vacation Fund", 100.0, 0.0)]);

        let response = set
            .invoke(
                &owner(),
                &ToolCall::new("update_goal")
                    .with_arg("identifier", json!("vacation"))
                    .with_arg("target_amount", json!(250.0))
                    .with_arg("deadline", json!("2025-06-01"))
                    .with_arg("confirmed_id", json!("goal_00000001")),
            )
            .await;

        assert!(response.is_success());
        let rows = store.rows.lock().unwrap();
        assert_eq!(rows[0].target_amount, 250.0);
        assert_eq!(rows[0].deadline, NaiveDate::from_ymd_opt(2025, 6, 1));
    }

    #[tokio::test]
    async fn create_rejects_a_non_positive_target() {
        let (set, store) = set_with(vec![]);

        let response = set
            .invoke(
                &owner(),
                &ToolCall::new("create_goal")
                    .with_arg("name", json!("Nothing"))
                    .with_arg("target_amount", json!(0)),
            )
            .await;

        let ToolResponse::Failed { error } = response else {
            panic!("expected failure");
        };
        assert!(error.contains("greater than zero"), "{error}");
        assert!(store.rows.lock().unwrap().is_empty());
    }
}
