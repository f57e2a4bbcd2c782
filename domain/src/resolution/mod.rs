//! The entity-resolution protocol's value objects.
//!
//! Free text goes in, exactly one of three outcomes comes out:
//!
//! ```text
//!  "loan from John" ──▶ resolve ──▶ Resolved { id }          (one match)
//!                               ├─▶ Clarify  { options }     (2..=5 matches)
//!                               └─▶ NotFound { reason }      (no match)
//! ```
//!
//! `NotFound` is a value, not an error: the caller branches on it and turns
//! it into user-facing language. A protected mutation additionally passes
//! through a [`PendingAction`] so the human confirms the exact row before
//! anything irreversible happens.

mod traits;
mod value_objects;

pub use traits::ResolvableRow;
pub use value_objects::{
    CandidateOption, MAX_CLARIFY_OPTIONS, PendingAction, ResolutionOutcome,
};
