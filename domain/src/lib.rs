//! Domain layer for bursar
//!
//! This crate contains the core types and pure logic of the conversational
//! action layer: identifiers, finance records, calendar math, the resolution
//! protocol, and the tool envelope. It has no dependencies on infrastructure
//! or on any store.
//!
//! # Core Concepts
//!
//! ## Resolution
//!
//! Users never type database ids. Free text ("loan from John", "my bank
//! account") is resolved against a user-scoped domain into a
//! [`ResolutionOutcome`]: exactly one match, a short clarification list, or
//! not-found. `Resolved` is only ever returned for a unique match.
//!
//! ## Confirmation
//!
//! Mutations of existing records run in two phases. *Identify* resolves the
//! target and returns a [`PendingAction`] whose id doubles as the
//! confirmation token; *execute* acts only when that exact id is echoed back,
//! re-validating it against the store. No fuzzy matching ever authorizes a
//! mutation directly.
//!
//! ## Intervals
//!
//! Duration phrases ("last month", "2024-08", "2024-01-01,2024-01-31", "all")
//! normalize to closed millisecond-bounded [`Interval`]s, and every interval
//! has a shape-aware preceding interval for period-over-period comparison.

pub mod core;
pub mod finance;
pub mod interval;
pub mod resolution;
pub mod tool;

// Re-export commonly used types
pub use crate::core::{EntityDomain, Identifier, UserId, truncate_label};
pub use finance::{
    Account, AccountKind, AccountPatch, Budget, BudgetPeriod, Category, CategoryKind, Debt,
    DebtDirection, DebtStatus, Goal, GoalPatch, NewAccount, NewBudget, NewCategory, NewDebt,
    NewGoal, NewTransaction, ParseKindError, Transaction, UserRef, format_amount,
};
pub use interval::{Interval, IntervalError, IntervalShape, PeriodExpr, PeriodUnit};
pub use resolution::{
    CandidateOption, MAX_CLARIFY_OPTIONS, PendingAction, ResolutionOutcome, ResolvableRow,
};
pub use tool::{
    entities::{ActionRisk, ParamKind, ToolCall, ToolDefinition, ToolParameter},
    traits::{SchemaValidator, ToolValidator},
    value_objects::{ArgumentError, ToolResponse},
};
