//! Infrastructure layer for bursar
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod clock;
pub mod config;
pub mod demo;
pub mod logging;
pub mod store;

// Re-export commonly used types
pub use clock::SystemClock;
pub use config::{ConfigIssue, ConfigLoader, FileConfig, Severity};
pub use demo::{build_catalog, seed_ledger, DemoUsers};
pub use logging::JsonlActionLogger;
pub use store::{MemoryLedger, MemoryUserDirectory};
