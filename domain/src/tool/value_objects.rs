//! Tool response envelope and argument errors.
//!
//! [`ToolResponse`] is the single shape every conversational action returns.
//! The enum makes the "needs clarification" / "needs confirmation" flags
//! mutually exclusive at the type level; a hand-written [`Serialize`] flattens
//! it into the JSON contract the dispatcher expects:
//!
//! ```text
//! Completed            {"success":true,  "message":..., "data":...}
//! ClarificationNeeded  {"success":true,  "clarificationNeeded":true, "message":..., "options":[...]}
//! ConfirmationNeeded   {"success":true,  "confirmationNeeded":true,  "id":..., "details":..., "message":...}
//! Failed               {"success":false, "error":...}
//! ```

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::resolution::{CandidateOption, PendingAction};

/// A tool call argument failed schema validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("missing required argument `{0}`")]
    Missing(String),
    #[error("invalid argument `{name}`: {reason}")]
    Invalid { name: String, reason: String },
}

impl ArgumentError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ArgumentError::Invalid {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Uniform result of one tool invocation.
///
/// The first three variants all mean the call itself made progress
/// (`success: true` on the wire); only [`Failed`](ToolResponse::Failed) is a
/// hard failure. Error text is always a short human-readable sentence, never
/// an internal error rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResponse {
    /// The action ran to completion.
    Completed {
        message: String,
        data: Option<serde_json::Value>,
    },
    /// Several records matched; the human must pick one.
    ClarificationNeeded {
        message: String,
        options: Vec<CandidateOption>,
    },
    /// Exactly one record identified; the human must echo `id` back to
    /// authorize the mutation.
    ConfirmationNeeded {
        id: String,
        details: String,
        message: String,
    },
    /// The action failed; `error` is safe to show the end user.
    Failed { error: String },
}

impl ToolResponse {
    pub fn completed(message: impl Into<String>) -> Self {
        ToolResponse::Completed {
            message: message.into(),
            data: None,
        }
    }

    pub fn completed_with_data(message: impl Into<String>, data: serde_json::Value) -> Self {
        ToolResponse::Completed {
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn clarification(message: impl Into<String>, options: Vec<CandidateOption>) -> Self {
        ToolResponse::ClarificationNeeded {
            message: message.into(),
            options,
        }
    }

    /// Wraps the identify phase's output; `details` carries the row summary
    /// so the confirming human can catch a wrong match.
    pub fn confirmation(pending: PendingAction, message: impl Into<String>) -> Self {
        ToolResponse::ConfirmationNeeded {
            id: pending.id.as_str().to_string(),
            details: pending.summary,
            message: message.into(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        ToolResponse::Failed {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, ToolResponse::Failed { .. })
    }

    /// True when the call needs another human turn before anything mutates.
    pub fn needs_follow_up(&self) -> bool {
        matches!(
            self,
            ToolResponse::ClarificationNeeded { .. } | ToolResponse::ConfirmationNeeded { .. }
        )
    }

    /// Short tag for audit events.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolResponse::Completed { .. } => "completed",
            ToolResponse::ClarificationNeeded { .. } => "clarification",
            ToolResponse::ConfirmationNeeded { .. } => "confirmation",
            ToolResponse::Failed { .. } => "failed",
        }
    }
}

impl Serialize for ToolResponse {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ToolResponse::Completed { message, data } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("message", message)?;
                if let Some(data) = data {
                    map.serialize_entry("data", data)?;
                }
                map.end()
            }
            ToolResponse::ClarificationNeeded { message, options } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("clarificationNeeded", &true)?;
                map.serialize_entry("message", message)?;
                map.serialize_entry("options", options)?;
                map.end()
            }
            ToolResponse::ConfirmationNeeded {
                id,
                details,
                message,
            } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("confirmationNeeded", &true)?;
                map.serialize_entry("id", id)?;
                map.serialize_entry("details", details)?;
                map.serialize_entry("message", message)?;
                map.end()
            }
            ToolResponse::Failed { error } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EntityDomain, Identifier};
    use serde_json::json;

    #[test]
    fn completed_serializes_flat() {
        let response = ToolResponse::completed_with_data("Created account", json!({"id": "acc_1234abcd"}));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "message": "Created account",
                "data": {"id": "acc_1234abcd"}
            })
        );
    }

    #[test]
    fn completed_without_data_omits_the_field() {
        let value = serde_json::to_value(ToolResponse::completed("Done")).unwrap();
        assert_eq!(value, json!({"success": true, "message": "Done"}));
    }

    #[test]
    fn clarification_carries_options() {
        let response = ToolResponse::clarification(
            "Multiple debts match \"loan\". Which one?",
            vec![
                CandidateOption::new("debt_11112222", "lent to Jordan Reyes - $45.00 (lunch loan)"),
                CandidateOption::new("debt_33334444", "borrowed from Sam Okafor - $200.00 (car loan)"),
            ],
        );
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["clarificationNeeded"], json!(true));
        assert_eq!(value["options"].as_array().unwrap().len(), 2);
        assert_eq!(value["options"][0]["id"], json!("debt_11112222"));
        assert!(value.get("confirmationNeeded").is_none());
    }

    #[test]
    fn confirmation_echoes_the_pending_id() {
        let pending = PendingAction::new(
            Identifier::new("debt_11112222"),
            EntityDomain::Debt,
            "pending debt of $45.00 lent to Jordan Reyes",
        );
        let response = ToolResponse::confirmation(pending, "Confirm deletion?");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["confirmationNeeded"], json!(true));
        assert_eq!(value["id"], json!("debt_11112222"));
        assert_eq!(value["details"], json!("pending debt of $45.00 lent to Jordan Reyes"));
        assert!(value.get("clarificationNeeded").is_none());
    }

    #[test]
    fn failure_has_only_the_error() {
        let value = serde_json::to_value(ToolResponse::failed("No account found matching \"brokerage\"")).unwrap();
        assert_eq!(
            value,
            json!({"success": false, "error": "No account found matching \"brokerage\""})
        );
        assert!(!ToolResponse::failed("x").is_success());
    }

    #[test]
    fn follow_up_detection() {
        assert!(ToolResponse::clarification("pick", vec![]).needs_follow_up());
        assert!(!ToolResponse::completed("ok").needs_follow_up());
        assert_eq!(ToolResponse::completed("ok").kind(), "completed");
        assert_eq!(ToolResponse::failed("no").kind(), "failed");
    }
}
