//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts the surrounding system must implement for
//! this layer: the domain stores, the user directory, the clock, and the
//! audit logger.

pub mod action_log;
pub mod clock;
pub mod directory;
pub mod stores;

pub use action_log::{ActionEvent, ActionLogger, ActionOutcome, NoopActionLogger};
pub use clock::{Clock, FixedClock};
pub use directory::UserDirectory;
pub use stores::{
    AccountStore, ActivityTimeline, BudgetStore, CategoryStore, DebtStore, DomainStore, GoalStore,
    StoreError, TransactionStore,
};
