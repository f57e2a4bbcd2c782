//! Tool schema entities: definitions, parameters, and incoming calls.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::value_objects::ArgumentError;

/// What a tool does to the ledger, and whether it is confirmation-gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionRisk {
    /// Read-only queries; safe to repeat.
    Read,
    /// Additive writes (create a row, contribute to a goal), executed
    /// directly.
    Write,
    /// Modifies or removes an existing row; runs through identify + confirm.
    Protected,
}

impl ActionRisk {
    pub fn as_str(&self) -> &str {
        match self {
            ActionRisk::Read => "read",
            ActionRisk::Write => "write",
            ActionRisk::Protected => "protected",
        }
    }

    pub fn requires_confirmation(&self) -> bool {
        matches!(self, ActionRisk::Protected)
    }

    pub fn mutates(&self) -> bool {
        !matches!(self, ActionRisk::Read)
    }
}

impl std::fmt::Display for ActionRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Type hint for a declared tool argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    /// Free text (names, notes, fuzzy identifiers).
    Text,
    /// JSON number.
    Number,
    /// `YYYY-MM-DD` calendar date.
    Date,
    /// Duration expression ("last month", "2024-08", "iso,iso", "all").
    Period,
}

impl ParamKind {
    pub fn as_str(&self) -> &str {
        match self {
            ParamKind::Text => "text",
            ParamKind::Number => "number",
            ParamKind::Date => "date",
            ParamKind::Period => "period",
        }
    }
}

/// Parameter specification for a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub kind: ParamKind,
    /// Non-empty for enumerated arguments; values are matched
    /// case-insensitively.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<String>,
}

impl ToolParameter {
    pub fn required(name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: true,
            kind,
            one_of: Vec::new(),
        }
    }

    pub fn optional(name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: false,
            kind,
            one_of: Vec::new(),
        }
    }

    pub fn with_choices(mut self, choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.one_of = choices.into_iter().map(Into::into).collect();
        self
    }
}

/// Schema for a single named tool: what the dispatcher shows its language
/// model, and what the catalog validates calls against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name (e.g. "delete_debt").
    pub name: String,
    /// Human-readable description surfaced to the dispatcher.
    pub description: String,
    pub risk: ActionRisk,
    pub parameters: Vec<ToolParameter>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, risk: ActionRisk) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            risk,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn requires_confirmation(&self) -> bool {
        self.risk.requires_confirmation()
    }

    pub fn parameter(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// One incoming invocation: a tool name plus loosely-typed JSON arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool_name: String,
    #[serde(default)]
    pub arguments: HashMap<String, serde_json::Value>,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Optional string argument, trimmed; `None` when absent, non-string, or
    /// blank.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.arguments
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn require_str(&self, key: &str) -> Result<&str, ArgumentError> {
        self.get_str(key)
            .ok_or_else(|| ArgumentError::Missing(key.to_string()))
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.arguments.get(key).and_then(|v| v.as_f64())
    }

    pub fn require_f64(&self, key: &str) -> Result<f64, ArgumentError> {
        match self.arguments.get(key) {
            None | Some(serde_json::Value::Null) => Err(ArgumentError::Missing(key.to_string())),
            Some(value) => value.as_f64().ok_or_else(|| ArgumentError::Invalid {
                name: key.to_string(),
                reason: "expected a number".to_string(),
            }),
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.arguments.get(key).and_then(|v| v.as_bool())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_gating() {
        assert!(!ActionRisk::Read.requires_confirmation());
        assert!(!ActionRisk::Write.requires_confirmation());
        assert!(ActionRisk::Protected.requires_confirmation());
        assert!(ActionRisk::Write.mutates());
        assert!(!ActionRisk::Read.mutates());
    }

    #[test]
    fn definition_builder() {
        let tool = ToolDefinition::new("delete_debt", "Delete a debt record", ActionRisk::Protected)
            .with_parameter(ToolParameter::required(
                "identifier",
                ParamKind::Text,
                "Debt to delete (description, counterparty, or id)",
            ))
            .with_parameter(ToolParameter::optional(
                "confirmed_id",
                ParamKind::Text,
                "Id echoed back from the confirmation prompt",
            ));

        assert!(tool.requires_confirmation());
        assert_eq!(tool.parameters.len(), 2);
        assert!(tool.parameter("identifier").is_some_and(|p| p.required));
        assert!(tool.parameter("confirmed_id").is_some_and(|p| !p.required));
        assert!(tool.parameter("nope").is_none());
    }

    #[test]
    fn call_string_arguments_are_trimmed() {
        let call = ToolCall::new("create_account").with_arg("name", "  Main Checking  ");
        assert_eq!(call.get_str("name"), Some("Main Checking"));
        assert_eq!(call.require_str("name").unwrap(), "Main Checking");
    }

    #[test]
    fn call_blank_string_counts_as_missing() {
        let call = ToolCall::new("create_account").with_arg("name", "   ");
        assert_eq!(call.get_str("name"), None);
        assert!(matches!(
            call.require_str("name"),
            Err(ArgumentError::Missing(name)) if name == "name"
        ));
    }

    #[test]
    fn call_number_arguments() {
        let call = ToolCall::new("create_goal")
            .with_arg("target_amount", 1500.0)
            .with_arg("name", "Vacation");
        assert_eq!(call.require_f64("target_amount").unwrap(), 1500.0);
        assert!(matches!(
            call.require_f64("name"),
            Err(ArgumentError::Invalid { name, .. }) if name == "name"
        ));
        assert!(matches!(
            call.require_f64("absent"),
            Err(ArgumentError::Missing(_))
        ));
    }
}
