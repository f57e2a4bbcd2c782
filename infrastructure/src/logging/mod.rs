//! Logging infrastructure: structured action auditing.
//!
//! Provides [`JsonlActionLogger`], a JSONL file writer that implements
//! the [`ActionLogger`](bursar_application::ActionLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlActionLogger;
