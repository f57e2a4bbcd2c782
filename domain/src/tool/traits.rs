//! Schema validation for incoming tool calls.
//!
//! Pure logic; the catalog in the application layer runs this before
//! dispatching a call to its tool set.

use super::entities::{ParamKind, ToolCall, ToolDefinition};
use super::value_objects::ArgumentError;

/// Validates a call against a tool's declared schema.
pub trait ToolValidator {
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), ArgumentError>;
}

/// Checks required arguments, rejects undeclared ones, and type-checks each
/// value against its [`ParamKind`]. Domain rules (positive amounts, date
/// grammar) stay in the tool implementations.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl ToolValidator for SchemaValidator {
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), ArgumentError> {
        for param in &definition.parameters {
            let value = match call.arguments.get(&param.name) {
                Some(serde_json::Value::Null) | None => {
                    if param.required {
                        return Err(ArgumentError::Missing(param.name.clone()));
                    }
                    continue;
                }
                Some(value) => value,
            };

            match param.kind {
                ParamKind::Number => {
                    if !value.is_number() {
                        return Err(ArgumentError::invalid(&param.name, "expected a number"));
                    }
                }
                ParamKind::Text | ParamKind::Date | ParamKind::Period => {
                    let text = value
                        .as_str()
                        .ok_or_else(|| ArgumentError::invalid(&param.name, "expected a string"))?;
                    if param.required && text.trim().is_empty() {
                        return Err(ArgumentError::Missing(param.name.clone()));
                    }
                    if !param.one_of.is_empty()
                        && !param.one_of.iter().any(|c| c.eq_ignore_ascii_case(text.trim()))
                    {
                        return Err(ArgumentError::invalid(
                            &param.name,
                            format!("expected one of: {}", param.one_of.join(", ")),
                        ));
                    }
                }
            }
        }

        for name in call.arguments.keys() {
            if definition.parameter(name).is_none() {
                return Err(ArgumentError::invalid(
                    name,
                    format!("not an argument of `{}`", definition.name),
                ));
            }
        }

        Ok(())
    }
}
