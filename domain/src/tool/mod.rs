//! Tool schema and response envelope.
//!
//! Everything the conversational layer sees of this system is a set of named
//! tools. Each tool is described by a [`ToolDefinition`] (name, parameters,
//! [`ActionRisk`]), invoked via a [`ToolCall`], and answered with a
//! [`ToolResponse`].
//!
//! ```text
//! ┌────────────────┐    ┌──────────────┐    ┌──────────────────┐
//! │ ToolDefinition │───▶│ ToolCall     │───▶│ ToolResponse     │
//! │ (schema)       │    │ (invocation) │    │ (flat envelope)  │
//! └───────┬────────┘    └──────────────┘    └──────────────────┘
//!         │
//!         └─ SchemaValidator rejects malformed calls before dispatch
//! ```
//!
//! # Risk-based confirmation
//!
//! Each tool's [`ActionRisk`] decides whether it runs directly or through the
//! two-phase confirmation protocol:
//!
//! | Risk | Examples | Confirmation |
//! |------|----------|--------------|
//! | **Read** | `list_accounts`, `spending_summary` | No |
//! | **Write** | `create_category`, `contribute_to_goal` | No (additive, correctable) |
//! | **Protected** | `delete_debt`, `mark_debt_paid`, `rename_account` | Yes (identify + confirm) |
//!
//! # Key types
//!
//! - [`ToolDefinition`] / [`ToolParameter`]: schema surfaced to the dispatcher
//! - [`ToolCall`]: one invocation with loosely-typed JSON arguments
//! - [`ToolResponse`]: the uniform envelope (success / clarification /
//!   confirmation / error), mutually exclusive by construction
//! - [`SchemaValidator`]: pure argument validation against the schema

pub mod entities;
pub mod traits;
pub mod value_objects;

pub use entities::{ActionRisk, ParamKind, ToolCall, ToolDefinition, ToolParameter};
pub use traits::{SchemaValidator, ToolValidator};
pub use value_objects::{ArgumentError, ToolResponse};
