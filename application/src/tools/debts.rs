//! Debt tools: record, list, update description, settle, delete.
//!
//! Debts are the only rows shared between two users. The store enforces
//! the role rules (creator-only edits, either party settles); this layer
//! resolves the counterparty from free text and rejects self-debts.

use std::sync::Arc;

use async_trait::async_trait;
use bursar_domain::core::UserId;
use bursar_domain::finance::{Debt, DebtDirection, DebtStatus, NewDebt, format_amount};
use bursar_domain::tool::{
    ActionRisk, ParamKind, ToolCall, ToolDefinition, ToolParameter, ToolResponse,
};
use tracing::info;

use crate::gate::ActionGate;
use crate::ports::directory::UserDirectory;
use crate::ports::stores::DebtStore;
use crate::resolver::{UserResolution, UserResolver};
use crate::tools::args::{self, confirmed_id_param, identifier_param};
use crate::tools::{ToolFailure, ToolOutcome, ToolSet, count, identify_or_reply, to_data};

pub struct DebtToolSet {
    store: Arc<dyn DebtStore>,
    users: UserResolver<dyn UserDirectory>,
    gate: ActionGate<dyn DebtStore>,
}

impl DebtToolSet {
    pub fn new(store: Arc<dyn DebtStore>, directory: Arc<dyn UserDirectory>) -> Self {
        DebtToolSet {
            gate: ActionGate::new(store.clone()),
            users: UserResolver::new(directory),
            store,
        }
    }

    pub fn with_clarify_cap(mut self, cap: usize) -> Self {
        self.gate = self.gate.with_clarify_cap(cap);
        self
    }

    fn recorded_wording(debt: &Debt) -> String {
        match debt.direction {
            DebtDirection::Lent => format!(
                "you lent {} to {}",
                format_amount(debt.amount),
                debt.counterparty_name
            ),
            DebtDirection::Borrowed => format!(
                "you borrowed {} from {}",
                format_amount(debt.amount),
                debt.counterparty_name
            ),
        }
    }

    async fn create(&self, user: &UserId, call: &ToolCall) -> ToolOutcome {
        let counterparty = call.require_str("counterparty")?;
        let direction = args::require_kind::<DebtDirection>(call, "direction")?;
        let amount = args::positive_amount(call, "amount")?;
        let description = call.require_str("description")?.to_string();

        let other = match self.users.resolve(counterparty).await? {
            UserResolution::Matched(user_ref) => user_ref,
            UserResolution::Clarify(options) => {
                return Ok(ToolResponse::clarification(
                    format!("Multiple people match \"{counterparty}\". Which one did you mean?"),
                    options,
                ));
            }
            UserResolution::NotFound { reason } => return Ok(ToolResponse::failed(reason)),
        };
        if other.id == *user {
            return Ok(ToolResponse::failed("You cannot record a debt with yourself."));
        }

        let payload = NewDebt::new(other.id, direction, amount, description);
        let debt = self.store.create(user, payload).await?;
        info!(id = %debt.id, "debt recorded");

        Ok(ToolResponse::completed_with_data(
            format!(
                "Recorded that {} for \"{}\".",
                Self::recorded_wording(&debt),
                debt.description
            ),
            to_data(&debt)?,
        ))
    }

    async fn list(&self, user: &UserId, call: &ToolCall) -> ToolOutcome {
        let status = args::parse_kind::<DebtStatus>(call, "status")?;
        let debts = self.store.list(user, status).await?;

        let message = if debts.is_empty() {
            match status {
                Some(status) => format!("You have no {status} debts."),
                None => "You have no debts on record.".to_string(),
            }
        } else {
            let noun = match status {
                Some(status) => (format!("{status} debt"), format!("{status} debts")),
                None => ("debt".to_string(), "debts".to_string()),
            };
            format!("You have {} on record.", count(debts.len(), &noun.0, &noun.1))
        };
        Ok(ToolResponse::completed_with_data(message, to_data(&debts)?))
    }

    async fn update_description(&self, user: &UserId, call: &ToolCall) -> ToolOutcome {
        let target = call.require_str("identifier")?;
        let description = call.require_str("description")?.to_string();

        let Some(confirmed) = call.get_str("confirmed_id") else {
            return identify_or_reply(&self.gate, user, target, |summary| {
                format!("rewrite the description of {summary}")
            })
            .await;
        };

        let store = self.store.clone();
        let owner = user.clone();
        let updated = self
            .gate
            .execute(user, confirmed, move |row| async move {
                store.update_description(&owner, &row.id, &description).await
            })
            .await?;

        Ok(ToolResponse::completed_with_data(
            format!("Updated the debt description to \"{}\".", updated.description),
            to_data(&updated)?,
        ))
    }

    async fn mark_paid(&self, user: &UserId, call: &ToolCall) -> ToolOutcome {
        let target = call.require_str("identifier")?;

        let Some(confirmed) = call.get_str("confirmed_id") else {
            return identify_or_reply(&self.gate, user, target, |summary| {
                format!("mark {summary} as paid")
            })
            .await;
        };

        let store = self.store.clone();
        let owner = user.clone();
        let settled = self
            .gate
            .execute(user, confirmed, move |row| async move {
                store.mark_paid(&owner, &row.id).await
            })
            .await?;
        info!(id = %settled.id, "debt settled");

        Ok(ToolResponse::completed_with_data(
            format!(
                "Marked the {} debt with {} as paid.",
                format_amount(settled.amount),
                settled.counterparty_name
            ),
            to_data(&settled)?,
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
        info!(id = %deleted.id, "debt deleted");

        Ok(ToolResponse::completed(format!(
            "Deleted the debt with {}.",
            deleted.counterparty_name
        )))
    }
}

#[async_trait]
impl ToolSet for DebtToolSet {
    fn name(&self) -> &'static str {
        "debts"
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition::new(
                "create_debt",
                "Record money lent to or borrowed from another person",
                ActionRisk::Write,
            )
            .with_parameter(ToolParameter::required(
                "counterparty",
                ParamKind::Text,
                "The other person: their exact email or full name",
            ))
            .with_parameter(
                ToolParameter::required("direction", ParamKind::Text, "Whether you lent or borrowed")
                    .with_choices(["lent", "borrowed"]),
            )
            .with_parameter(ToolParameter::required(
                "amount",
                ParamKind::Number,
                "Amount owed; must be positive",
            ))
            .with_parameter(ToolParameter::required(
                "description",
                ParamKind::Text,
                "What the debt is for",
            )),
            ToolDefinition::new(
                "list_debts",
                "List debts you are part of, optionally filtered by status",
                ActionRisk::Read,
            )
            .with_parameter(
                ToolParameter::optional("status", ParamKind::Text, "Restrict to one status")
                    .with_choices(["pending", "paid"]),
            ),
            ToolDefinition::new(
                "update_debt_description",
                "Rewrite the description of a debt you created",
                ActionRisk::Protected,
            )
            .with_parameter(identifier_param(
                "Debt to edit: the other person's name, words from the description, or the debt id",
            ))
            .with_parameter(ToolParameter::required(
                "description",
                ParamKind::Text,
                "New description",
            ))
            .with_parameter(confirmed_id_param()),
            ToolDefinition::new(
                "mark_debt_paid",
                "Settle a pending debt; either party may do this",
                ActionRisk::Protected,
            )
            .with_parameter(identifier_param(
                "Debt to settle: the other person's name, words from the description, or the debt id",
            ))
            .with_parameter(confirmed_id_param()),
            ToolDefinition::new(
                "delete_debt",
                "Delete a debt you created",
                ActionRisk::Protected,
            )
            .with_parameter(identifier_param(
                "Debt to delete: the other person's name, words from the description, or the debt id",
            ))
            .with_parameter(confirmed_id_param()),
        ]
    }

    async fn invoke(&self, user: &UserId, call: &ToolCall) -> ToolResponse {
        let result = match call.tool_name.as_str() {
            "create_debt" => self.create(user, call).await,
            "list_debts" => self.list(user, call).await,
            "update_debt_description" => self.update_description(user, call).await,
            "mark_debt_paid" => self.mark_paid(user, call).await,
            "delete_debt" => self.delete(user, call).await,
            other => Err(ToolFailure::Message(format!("Unknown tool \"{other}\""))),
        };
        result.unwrap_or_else(ToolFailure::into_response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bursar_domain::core::{EntityDomain, Identifier};
    use bursar_domain::finance::UserRef;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::ports::stores::{DomainStore, StoreError};

    struct MemDebts {
        rows: Mutex<Vec<Debt>>,
    }

    struct MemDirectory {
        users: Vec<UserRef>,
    }

    fn me() -> UserId {
        UserId::new("usr_0000aaaa")
    }

    fn jordan() -> UserRef {
        UserRef {
            id: UserId::new("usr_0000bbbb"),
            name: "Jordan Reyes".to_string(),
            email: "jordan@example.com".to_string(),
        }
    }

    fn myself() -> UserRef {
        UserRef {
            id: me(),
            name: "Sam Okafor".to_string(),
            email: "sam@example.com".to_string(),
        }
    }

    fn debt(id: &str, description: &str) -> Debt {
        Debt {
            id: Identifier::new(id),
            creator_id: me(),
            counterparty_id: jordan().id,
            counterparty_name: jordan().name,
            direction: DebtDirection::Lent,
            amount: 45.0,
            description: description.to_string(),
            status: DebtStatus::Pending,
            created_at: Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap(),
        }
    }

    #[async_trait]
    impl DomainStore for MemDebts {
        type Row = Debt;

        fn domain(&self) -> EntityDomain {
            EntityDomain::Debt
        }

        async fn find_by_fuzzy_key(
            &self,
            user: &UserId,
            text: &str,
        ) -> Result<Vec<Debt>, StoreError> {
            let needle = text.to_lowercase();
            Ok(self
                .rows
                .lock()
                .unwrap()
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
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|d| d.id == *id && d.involves(user))
                .cloned())
        }
    }

    #[async_trait]
    impl DebtStore for MemDebts {
        async fn create(&self, user: &UserId, payload: NewDebt) -> Result<Debt, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let created = Debt {
                id: Identifier::new(format!("debt_{:08x}", rows.len() + 1)),
                creator_id: user.clone(),
                counterparty_id: payload.counterparty_id,
                counterparty_name: jordan().name,
                direction: payload.direction,
                amount: payload.amount,
                description: payload.description,
                status: DebtStatus::Pending,
                created_at: Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap(),
            };
            rows.push(created.clone());
            Ok(created)
        }

        async fn update_description(
            &self,
            user: &UserId,
            id: &Identifier,
            description: &str,
        ) -> Result<Debt, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|d| d.id == *id && d.involves(user))
                .ok_or(StoreError::NotFound(EntityDomain::Debt))?;
            if !row.is_creator(user) {
                return Err(StoreError::Forbidden(EntityDomain::Debt));
            }
            row.description = description.to_string();
            Ok(row.clone())
        }

        async fn mark_paid(&self, user: &UserId, id: &Identifier) -> Result<Debt, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|d| d.id == *id && d.involves(user))
                .ok_or(StoreError::NotFound(EntityDomain::Debt))?;
            if row.status == DebtStatus::Paid {
                return Err(StoreError::Conflict("this debt is already settled".into()));
            }
            row.status = DebtStatus::Paid;
            Ok(row.clone())
        }

        async fn delete(&self, user: &UserId, id: &Identifier) -> Result<Debt, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let index = rows
                .iter()
                .position(|d| d.id == *id && d.involves(user))
                .ok_or(StoreError::NotFound(EntityDomain::Debt))?;
            if !rows[index].is_creator(user) {
                return Err(StoreError::Forbidden(EntityDomain::Debt));
            }
            Ok(rows.remove(index))
        }

        async fn list(
            &self,
            user: &UserId,
            status: Option<DebtStatus>,
        ) -> Result<Vec<Debt>, StoreError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|d| d.involves(user) && status.is_none_or(|s| d.status == s))
                .cloned()
                .collect())
        }
    }

    #[async_trait]
    impl UserDirectory for MemDirectory {
        async fn find_exact(&self, text: &str) -> Result<Vec<UserRef>, StoreError> {
            let needle = text.to_lowercase();
            Ok(self
                .users
                .iter()
                .filter(|u| {
                    u.email.to_lowercase() == needle || u.name.to_lowercase() == needle
                })
                .cloned()
                .collect())
        }

        async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRef>, StoreError> {
            Ok(self.users.iter().find(|u| u.id == *id).cloned())
        }
    }

    fn set_with(rows: Vec<Debt>) -> (DebtToolSet, Arc<MemDebts>) {
        let store = Arc::new(MemDebts {
            rows: Mutex::new(rows),
        });
        let directory = Arc::new(MemDirectory {
            users: vec![myself(), jordan()],
        });
        (DebtToolSet::new(store.clone(), directory), store)
    }

    #[tokio::test]
    async fn create_names_the_direction() {
        let (set, store) = set_with(vec![]);
        let response = set
            .invoke(
                &me(),
                &ToolCall::new("create_debt")
                    .with_arg("counterparty", json!("jordan@example.com"))
                    .with_arg("direction", json!("lent"))
                    .with_arg("amount", json!(45.0))
                    .with_arg("description", json!("lunch loan")),
            )
            .await;

        let ToolResponse::Completed { message, .. } = response else {
            panic!("expected completion");
        };
        assert!(message.contains("you lent $45.00 to Jordan Reyes"), "{message}");
        assert!(message.contains("lunch loan"), "{message}");
        assert_eq!(store.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn self_debts_are_rejected() {
        let (set, store) = set_with(vec![]);
        let response = set
            .invoke(
                &me(),
                &ToolCall::new("create_debt")
                    .with_arg("counterparty", json!("sam@example.com"))
                    .with_arg("direction", json!("borrowed"))
                    .with_arg("amount", json!(10.0))
                    .with_arg("description", json!("impossible")),
            )
            .await;

        let ToolResponse::Failed { error } = response else {
            panic!("expected failure");
        };
        assert!(error.contains("yourself"), "{error}");
        assert!(store.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_counterparty_suggests_exact_email() {
        let (set, _) = set_with(vec![]);
        let response = set
            .invoke(
                &me(),
                &ToolCall::new("create_debt")
                    .with_arg("counterparty", json!("jordan r"))
                    .with_arg("direction", json!("lent"))
                    .with_arg("amount", json!(5.0))
                    .with_arg("description", json!("coffee")),
            )
            .await;

        let ToolResponse::Failed { error } = response else {
            panic!("expected failure");
        };
        assert!(error.contains("\"jordan r\""), "{error}");
        assert!(error.contains("email"), "{error}");
    }

    #[tokio::test]
    async fn mark_paid_runs_the_two_phase_protocol() {
        let (set, store) = set_with(vec![debt("debt_00000001", "lunch loan")]);

        let first = set
            .invoke(
                &me(),
                &ToolCall::new("mark_debt_paid").with_arg("identifier", json!("lunch")),
            )
            .await;
        let ToolResponse::ConfirmationNeeded { id, message, .. } = first else {
            panic!("expected confirmation");
        };
        assert_eq!(id, "debt_00000001");
        assert!(message.contains("as paid"), "{message}");
        assert_eq!(store.rows.lock().unwrap()[0].status, DebtStatus::Pending);

        let second = set
            .invoke(
                &me(),
                &ToolCall::new("mark_debt_paid")
                    .with_arg("identifier", json!("lunch"))
                    .with_arg("confirmed_id", json!(id)),
            )
            .await;
        assert!(second.is_success());
        assert_eq!(store.rows.lock().unwrap()[0].status, DebtStatus::Paid);
    }

    #[tokio::test]
    async fn counterparty_delete_reads_as_not_found() {
        let (set, store) = set_with(vec![debt("debt_00000001", "lunch loan")]);
        let other = jordan().id;

        let response = set
            .invoke(
                &other,
                &ToolCall::new("delete_debt")
                    .with_arg("identifier", json!("lunch"))
                    .with_arg("confirmed_id", json!("debt_00000001")),
            )
            .await;

        let ToolResponse::Failed { error } = response else {
            panic!("expected failure");
        };
        assert!(error.contains("not found"), "{error}");
        assert!(!error.to_lowercase().contains("authorized"), "{error}");
        assert_eq!(store.rows.lock().unwrap().len(), 1);
    }
}
