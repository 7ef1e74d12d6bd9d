//! Tool registry for managing available tools

use crate::{Tool, ToolDescriptor, ToolResult};
use finchat_core::{Error, Result};
use finchat_llm::ToolDefinition;
use futures::FutureExt;
use serde_json::Value;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Default character budget for a single tool result
pub const DEFAULT_MAX_RESULT_CHARS: usize = 3500;

/// Registry for managing tools
///
/// Lookups are by name; iteration order is the name order, which keeps the
/// tool list sent to the model stable.
pub struct ToolRegistry {
    tools: RwLock<BTreeMap<String, Arc<dyn Tool>>>,
    max_result_chars: usize,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_max_result_chars(DEFAULT_MAX_RESULT_CHARS)
    }
}

impl ToolRegistry {
    /// Create a new tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with a custom result budget
    pub fn with_max_result_chars(max_result_chars: usize) -> Self {
        Self {
            tools: RwLock::new(BTreeMap::new()),
            max_result_chars,
        }
    }

    /// Character budget applied to every result
    pub fn max_result_chars(&self) -> usize {
        self.max_result_chars
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        if tools.insert(name.clone(), tool).is_some() {
            warn!(tool = %name, "Replaced previously registered tool");
        } else {
            debug!(tool = %name, "Registered tool");
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.get(name).cloned()
    }

    /// Descriptors of every registered tool, sorted by name
    pub fn describe_all(&self) -> Vec<ToolDescriptor> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.values().map(|tool| tool.descriptor()).collect()
    }

    /// Tool definitions for a completion request
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.describe_all()
            .iter()
            .map(ToolDescriptor::to_definition)
            .collect()
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run a tool by name
    ///
    /// Only an unknown name is an error. Invalid arguments, tool failures and
    /// panics all come back as result text so the model can explain them.
    pub async fn invoke(&self, name: &str, arguments: Value) -> Result<ToolResult> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;

        info!(tool = %name, "Invoking tool");

        let text = match tool.descriptor().validate(&arguments) {
            Err(e) => {
                warn!(tool = %name, error = %e, "Rejected tool arguments");
                e.to_string()
            }
            Ok(()) => match AssertUnwindSafe(tool.execute(arguments)).catch_unwind().await {
                Ok(Ok(text)) => text,
                Ok(Err(e)) => {
                    warn!(tool = %name, error = %e, "Tool failed");
                    e.to_string()
                }
                Err(_) => {
                    warn!(tool = %name, "Tool panicked");
                    format!("Error running {name}: tool panicked")
                }
            },
        };

        let result = ToolResult::bounded(text, self.max_result_chars);
        debug!(
            tool = %name,
            chars = result.text.chars().count(),
            truncated = result.truncated,
            "Tool finished"
        );
        Ok(result)
    }
}
