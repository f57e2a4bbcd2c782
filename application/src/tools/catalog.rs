//! The catalog: one routing table over every registered tool set.
//!
//! Dispatch order is fixed: look the tool up, validate the call against its
//! schema, then hand it to the owning set. Every dispatch is recorded on
//! the audit port, whatever the outcome.

use std::collections::HashMap;
use std::sync::Arc;

use bursar_domain::core::UserId;
use bursar_domain::tool::{SchemaValidator, ToolCall, ToolDefinition, ToolResponse, ToolValidator};
use tracing::{debug, warn};

use crate::ports::action_log::{ActionEvent, ActionLogger, NoopActionLogger};
use crate::ports::clock::Clock;
use crate::tools::ToolSet;

pub struct ToolCatalog {
    sets: Vec<Arc<dyn ToolSet>>,
    /// Tool name to (owning set index, schema).
    index: HashMap<String, (usize, ToolDefinition)>,
    validator: SchemaValidator,
    logger: Arc<dyn ActionLogger>,
    clock: Arc<dyn Clock>,
}

impl ToolCatalog {
    pub fn new(sets: Vec<Arc<dyn ToolSet>>, clock: Arc<dyn Clock>) -> Self {
        let mut index = HashMap::new();
        for (position, set) in sets.iter().enumerate() {
            for definition in set.definitions() {
                let name = definition.name.clone();
                if index
                    .insert(name.clone(), (position, definition))
                    .is_some()
                {
                    // First registration would have been shadowed silently.
                    warn!(tool = %name, set = set.name(), "duplicate tool name; later set wins");
                }
            }
        }
        ToolCatalog {
            sets,
            index,
            validator: SchemaValidator,
            logger: Arc::new(NoopActionLogger),
            clock,
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ActionLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Every schema, sorted by tool name for stable listings.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> =
            self.index.values().map(|(_, d)| d.clone()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    pub fn definition(&self, tool: &str) -> Option<&ToolDefinition> {
        self.index.get(tool).map(|(_, d)| d)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Route one call and record it on the audit port.
    pub async fn dispatch(&self, user: &UserId, call: &ToolCall) -> ToolResponse {
        let response = self.route(user, call).await;
        self.logger
            .record(ActionEvent::new(self.clock.now(), user, &call.tool_name, &response));
        response
    }

    async fn route(&self, user: &UserId, call: &ToolCall) -> ToolResponse {
        let Some((position, definition)) = self.index.get(&call.tool_name) else {
            warn!(tool = %call.tool_name, "call to unknown tool");
            return ToolResponse::failed(format!("Unknown tool \"{}\"", call.tool_name));
        };

        if let Err(err) = self.validator.validate(call, definition) {
            return ToolResponse::failed(err.to_string());
        }

        let set = &self.sets[*position];
        debug!(tool = %call.tool_name, set = set.name(), "dispatching tool call");
        set.invoke(user, call).await
    }
}
