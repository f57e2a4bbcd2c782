//! Resolution outcomes, clarification candidates, and pending actions.

use serde::Serialize;

use crate::core::{EntityDomain, Identifier};
use crate::resolution::ResolvableRow;

/// Upper bound on how many candidates a clarification response carries.
/// More than this and the human is better served by typing a longer phrase.
pub const MAX_CLARIFY_OPTIONS: usize = 5;

/// One pickable candidate in a clarification response.
///
/// The id is stringly typed on purpose: record identifiers and user ids both
/// travel through the same clarification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateOption {
    pub id: String,
    pub label: String,
}

impl CandidateOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        CandidateOption {
            id: id.into(),
            label: label.into(),
        }
    }

    pub fn for_row(row: &impl ResolvableRow) -> Self {
        CandidateOption::new(row.id().as_str(), row.label())
    }
}

/// Result of resolving free text within one user's data: exactly one case.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    /// Exactly one row matched.
    Resolved { id: Identifier },
    /// Several rows matched; the human must narrow the choice.
    Clarify { options: Vec<CandidateOption> },
    /// Nothing matched within this user's data.
    NotFound { reason: String },
}

impl ResolutionOutcome {
    /// Build a clarification outcome, enforcing the option cap.
    ///
    /// Resolvers must collapse a single candidate to `Resolved` before
    /// reaching here; a one-element clarification is a protocol violation.
    pub fn clarify(options: Vec<CandidateOption>) -> Self {
        debug_assert!(options.len() >= 2, "clarification needs at least two candidates");
        let mut options = options;
        options.truncate(MAX_CLARIFY_OPTIONS);
        ResolutionOutcome::Clarify { options }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionOutcome::Resolved { .. })
    }
}

/// A protected mutation that has been identified but not yet confirmed.
///
/// Nothing is persisted between identify and execute: the id is the entire
/// state, and execute re-validates it from scratch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAction {
    pub id: Identifier,
    pub domain: EntityDomain,
    pub summary: String,
}

impl PendingAction {
    pub fn new(id: Identifier, domain: EntityDomain, summary: impl Into<String>) -> Self {
        PendingAction {
            id,
            domain,
            summary: summary.into(),
        }
    }
}
