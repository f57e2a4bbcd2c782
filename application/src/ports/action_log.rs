//! Port for structured action auditing.
//!
//! One event per dispatched tool call. This is separate from `tracing`:
//! tracing carries human-readable diagnostics, while this port captures a
//! machine-readable audit trail (one JSONL line per event in the file
//! adapter). Recording is synchronous and non-fallible so a broken log
//! never fails a dispatch.

use bursar_domain::core::UserId;
use bursar_domain::tool::ToolResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// How a dispatched call ended, from the envelope's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionOutcome {
    Completed,
    Clarification,
    Confirmation,
    Failed,
}

impl From<&ToolResponse> for ActionOutcome {
    fn from(response: &ToolResponse) -> Self {
        match response {
            ToolResponse::Completed { .. } => ActionOutcome::Completed,
            ToolResponse::ClarificationNeeded { .. } => ActionOutcome::Clarification,
            ToolResponse::ConfirmationNeeded { .. } => ActionOutcome::Confirmation,
            ToolResponse::Failed { .. } => ActionOutcome::Failed,
        }
    }
}

/// One audit record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEvent {
    #[serde(serialize_with = "rfc3339_millis")]
    pub at: DateTime<Utc>,
    pub user_id: String,
    pub tool: String,
    pub outcome: ActionOutcome,
}

/// RFC 3339 with millisecond precision, the shape log consumers expect.
fn rfc3339_millis<S: serde::Serializer>(
    at: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
}

impl ActionEvent {
    pub fn new(at: DateTime<Utc>, user: &UserId, tool: &str, response: &ToolResponse) -> Self {
        ActionEvent {
            at,
            user_id: user.as_str().to_string(),
            tool: tool.to_string(),
            outcome: ActionOutcome::from(response),
        }
    }
}

/// Port for recording audit events.
pub trait ActionLogger: Send + Sync {
    /// Fire-and-forget; implementations swallow their own failures.
    fn record(&self, event: ActionEvent);
}

/// Default when auditing is disabled.
pub struct NoopActionLogger;

impl ActionLogger for NoopActionLogger {
    fn record(&self, _event: ActionEvent) {}
}
