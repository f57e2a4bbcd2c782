//! Application layer for bursar
//!
//! This crate contains the conversational action services (entity
//! resolution, the confirmation gate, interval resolution), the port
//! definitions they run against, and the six tool sets plus the catalog
//! that dispatches them. It depends only on the domain layer.

pub mod gate;
pub mod intervals;
pub mod ports;
pub mod resolver;
pub mod tools;

// Re-export commonly used types
pub use gate::{ActionGate, GateError, Identification};
pub use intervals::IntervalResolver;
pub use ports::{
    action_log::{ActionEvent, ActionLogger, ActionOutcome, NoopActionLogger},
    clock::{Clock, FixedClock},
    directory::UserDirectory,
    stores::{
        AccountStore, ActivityTimeline, BudgetStore, CategoryStore, DebtStore, DomainStore,
        GoalStore, StoreError, TransactionStore,
    },
};
pub use resolver::{
    EntityResolver, ResolveError, RowResolution, UserResolution, UserResolver,
};
pub use tools::{
    AccountToolSet, BudgetToolSet, CategoryToolSet, DebtToolSet, GoalToolSet, ToolCatalog,
    ToolSet, TransactionToolSet,
};
