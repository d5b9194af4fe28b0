//! ToolRegistry - name to capability map, built once at startup

use std::collections::HashMap;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::llm::{ToolCall, ToolDefinition};

use super::builtin::{SeasonTool, TripDurationTool, WebSearchTool};
use super::{Tool, ToolError, ToolResult};

/// Registered tools, looked up by the name the model uses
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// The travel tool set: trip duration, season info and (if enabled) web search
    pub fn travel(search: &SearchConfig) -> Result<Self, ToolError> {
        debug!(search_enabled = %search.enabled, "ToolRegistry::travel: called");
        let mut registry = Self::empty();
        registry.register(Box::new(TripDurationTool));
        registry.register(Box::new(SeasonTool));
        if search.enabled {
            registry.register(Box::new(WebSearchTool::from_config(search)?));
        }
        Ok(registry)
    }

    /// Create an empty registry (for testing)
    pub fn empty() -> Self {
        Self { tools: HashMap::new() }
    }

    /// Add a tool, replacing any tool of the same name
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        debug!(tool_name = %tool.name(), "ToolRegistry::register: called");
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get tool definitions for the LLM, sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut names = self.tool_names();
        names.sort();
        self.definitions_for(&names)
    }

    /// Get definitions for a subset of tools by name; unknown names are skipped
    pub fn definitions_for(&self, tool_names: &[String]) -> Vec<ToolDefinition> {
        debug!(?tool_names, "ToolRegistry::definitions_for: called");
        tool_names
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| ToolDefinition::new(t.name(), t.description(), t.input_schema()))
            .collect()
    }

    /// Execute a tool call; never fails, problems come back as error results
    pub async fn execute(&self, tool_call: &ToolCall) -> ToolResult {
        debug!(tool_name = %tool_call.name, tool_id = %tool_call.id, "ToolRegistry::execute: called");
        let Some(tool) = self.tools.get(&tool_call.name) else {
            warn!(tool_name = %tool_call.name, "Model requested an unregistered tool");
            return ToolResult::error(format!("Tool '{}' not found", tool_call.name));
        };

        match tool.execute(tool_call.input.clone()).await {
            Ok(result) => result,
            Err(e) => {
                warn!(tool_name = %tool_call.name, error = %e, "Tool call failed");
                ToolResult::error(format!("Tool '{}' failed: {}", tool_call.name, e))
            }
        }
    }

    /// Execute one round of tool calls concurrently
    ///
    /// Results come back paired with their call id, in request order.
    pub async fn execute_all(&self, tool_calls: &[ToolCall]) -> Vec<(String, ToolResult)> {
        debug!(count = %tool_calls.len(), "ToolRegistry::execute_all: called");
        let results = join_all(tool_calls.iter().map(|call| self.execute(call))).await;
        tool_calls.iter().map(|c| c.id.clone()).zip(results).collect()
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names = self.tool_names();
        names.sort();
        f.debug_struct("ToolRegistry").field("tools", &names).finish()
    }
}
