//! Storage adapters for the application's store ports.

pub mod memory;

pub use memory::{
    MemoryAccountStore, MemoryBudgetStore, MemoryCategoryStore, MemoryDebtStore, MemoryGoalStore,
    MemoryLedger, MemoryTransactionStore, MemoryUserDirectory,
};
