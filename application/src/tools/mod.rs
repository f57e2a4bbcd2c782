//! The six conversational tool sets and their shared plumbing.
//!
//! Each tool set covers one finance domain and implements [`ToolSet`]: it
//! declares its tool schemas and answers invocations with a
//! [`ToolResponse`]. The [`catalog`] routes calls to sets, validating
//! arguments first.
//!
//! Protected tools all follow the same two-phase shape: a call without
//! `confirmed_id` identifies the target and returns a confirmation
//! envelope; a call with `confirmed_id` executes against that id alone.
//! Helpers here keep that shape identical across domains.

pub mod accounts;
pub mod args;
pub mod budgets;
pub mod catalog;
pub mod categories;
pub mod debts;
pub mod goals;
pub mod transactions;

pub use accounts::AccountToolSet;
pub use budgets::BudgetToolSet;
pub use catalog::ToolCatalog;
pub use categories::CategoryToolSet;
pub use debts::DebtToolSet;
pub use goals::GoalToolSet;
pub use transactions::TransactionToolSet;

use async_trait::async_trait;
use bursar_domain::core::{EntityDomain, UserId};
use bursar_domain::interval::IntervalError;
use bursar_domain::resolution::CandidateOption;
use bursar_domain::tool::{ArgumentError, ToolCall, ToolDefinition, ToolResponse};
use serde::Serialize;
use tracing::error;

use crate::gate::{ActionGate, GateError, Identification};
use crate::ports::stores::{DomainStore, StoreError};
use crate::resolver::{EntityResolver, ResolveError, RowResolution};

/// One domain's worth of conversational tools.
#[async_trait]
pub trait ToolSet: Send + Sync {
    /// Stable set name for logs ("accounts", "debts", ...).
    fn name(&self) -> &'static str;

    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Answer one call. Total: every failure becomes a failure envelope.
    async fn invoke(&self, user: &UserId, call: &ToolCall) -> ToolResponse;
}

pub(crate) type ToolOutcome = Result<ToolResponse, ToolFailure>;

/// Internal failure carrier for tool bodies, so `?` works across the error
/// types a tool touches. Rendered to a user-safe failure envelope at the
/// `invoke` boundary.
#[derive(Debug)]
pub(crate) enum ToolFailure {
    Argument(ArgumentError),
    Interval(IntervalError),
    Resolve(ResolveError),
    Gate(GateError),
    Store(StoreError),
    /// Already user-safe wording.
    Message(String),
}

impl From<ArgumentError> for ToolFailure {
    fn from(err: ArgumentError) -> Self {
        ToolFailure::Argument(err)
    }
}

impl From<IntervalError> for ToolFailure {
    fn from(err: IntervalError) -> Self {
        ToolFailure::Interval(err)
    }
}

impl From<ResolveError> for ToolFailure {
    fn from(err: ResolveError) -> Self {
        ToolFailure::Resolve(err)
    }
}

impl From<GateError> for ToolFailure {
    fn from(err: GateError) -> Self {
        ToolFailure::Gate(err)
    }
}

impl From<StoreError> for ToolFailure {
    fn from(err: StoreError) -> Self {
        ToolFailure::Store(err)
    }
}

const UNAVAILABLE_MESSAGE: &str = "The ledger is temporarily unavailable. Please try again.";

impl ToolFailure {
    pub(crate) fn into_response(self) -> ToolResponse {
        match self {
            ToolFailure::Argument(err) => ToolResponse::failed(err.to_string()),
            ToolFailure::Interval(err) => ToolResponse::failed(err.to_string()),
            ToolFailure::Message(message) => ToolResponse::failed(message),
            ToolFailure::Resolve(ResolveError::EmptyIdentifier) => {
                ToolResponse::failed("identifier text is empty")
            }
            ToolFailure::Resolve(ResolveError::Store(err)) | ToolFailure::Store(err) => {
                store_failure(err)
            }
            ToolFailure::Gate(err) => gate_failure(err),
        }
    }
}

/// Infra details go to the log, never to the user.
fn store_failure(err: StoreError) -> ToolResponse {
    match err {
        StoreError::Unavailable(detail) => {
            error!(%detail, "store failure during tool call");
            ToolResponse::failed(UNAVAILABLE_MESSAGE)
        }
        other => ToolResponse::failed(other.to_string()),
    }
}

fn gate_failure(err: GateError) -> ToolResponse {
    match err {
        GateError::Store(detail) => {
            error!(%detail, "store failure during gated mutation");
            ToolResponse::failed(UNAVAILABLE_MESSAGE)
        }
        other => ToolResponse::failed(other.to_string()),
    }
}

pub(crate) fn clarify(
    domain: EntityDomain,
    raw: &str,
    options: Vec<CandidateOption>,
) -> ToolResponse {
    ToolResponse::clarification(
        format!(
            "Multiple {} match \"{raw}\". Which one did you mean?",
            domain.plural()
        ),
        options,
    )
}

/// Row resolution folded for tool bodies: either the row, or the envelope
/// to return as-is (clarification or not-found).
pub(crate) enum Resolved<R> {
    Row(R),
    Reply(ToolResponse),
}

pub(crate) async fn resolve_or_reply<S>(
    resolver: &EntityResolver<S>,
    user: &UserId,
    raw: &str,
) -> Result<Resolved<S::Row>, ToolFailure>
where
    S: DomainStore + ?Sized,
{
    match resolver.resolve_row(user, raw).await? {
        RowResolution::Matched(row) => Ok(Resolved::Row(row)),
        RowResolution::Clarify(options) => {
            Ok(Resolved::Reply(clarify(resolver.domain(), raw, options)))
        }
        RowResolution::NotFound { reason } => Ok(Resolved::Reply(ToolResponse::failed(reason))),
    }
}

/// The identify phase of a protected tool. `describe` turns the matched
/// row's summary into "what you are about to do" wording.
pub(crate) async fn identify_or_reply<S, F>(
    gate: &ActionGate<S>,
    user: &UserId,
    raw: &str,
    describe: F,
) -> ToolOutcome
where
    S: DomainStore + ?Sized,
    F: FnOnce(&str) -> String,
{
    match gate.identify(user, raw).await? {
        Identification::Pending(pending) => {
            let message = format!(
                "You are about to {}. To proceed, repeat the call with confirmed_id \"{}\".",
                describe(&pending.summary),
                pending.id
            );
            Ok(ToolResponse::confirmation(pending, message))
        }
        Identification::Clarify(options) => Ok(clarify(gate.domain(), raw, options)),
        Identification::NotFound { reason } => Ok(ToolResponse::failed(reason)),
    }
}

pub(crate) fn to_data<T: Serialize>(value: &T) -> Result<serde_json::Value, ToolFailure> {
    serde_json::to_value(value).map_err(|err| {
        error!(error = %err, "response payload failed to serialize");
        ToolFailure::Message("Internal error preparing the response.".to_string())
    })
}

pub(crate) fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("1 {singular}")
    } else {
        format!("{n} {plural}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infrastructure_details_never_reach_the_user() {
        let response =
            store_failure(StoreError::Unavailable("pg: connection refused at 10.0.0.3".into()));
        let ToolResponse::Failed { error } = response else {
            panic!("expected failure");
        };
        assert!(!error.contains("pg:"));
        assert!(!error.contains("10.0.0.3"));
    }

    #[test]
    fn clarify_message_names_domain_and_text() {
        let response = clarify(
            EntityDomain::Category,
            "foo",
            vec![
                CandidateOption::new("cat_00000001", "Food (expense)"),
                CandidateOption::new("cat_00000002", "Footwear (expense)"),
            ],
        );
        let ToolResponse::ClarificationNeeded { message, options } = response else {
            panic!("expected clarification");
        };
        assert!(message.contains("categories"));
        assert!(message.contains("\"foo\""));
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn counting_reads_naturally() {
        assert_eq!(count(1, "account", "accounts"), "1 account");
        assert_eq!(count(3, "category", "categories"), "3 categories");
    }
}
