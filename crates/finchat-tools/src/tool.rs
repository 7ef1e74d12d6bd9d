//! Tool trait definition

use async_trait::async_trait;
use finchat_llm::{ToolDefinition, tools::schema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Failure of a single tool execution
///
/// These never abort a turn: the registry renders them into the tool result
/// text the model reads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// The tool ran but its backing service failed
    ///
    /// `action` reads as a verb phrase, e.g. `getting news for TSLA`.
    #[error("Error {action}: {detail}")]
    Failed {
        /// What the tool was doing
        action: String,
        /// Underlying failure
        detail: String,
    },

    /// The arguments do not fit the tool's parameters
    #[error("Error running {tool}: invalid arguments: {detail}")]
    InvalidArguments {
        /// Tool name
        tool: String,
        /// What is wrong with the arguments
        detail: String,
    },
}

impl ToolError {
    /// Create a [`ToolError::Failed`]
    pub fn failed(action: impl Into<String>, detail: impl ToString) -> Self {
        Self::Failed {
            action: action.into(),
            detail: detail.to_string(),
        }
    }

    /// Create a [`ToolError::InvalidArguments`]
    pub fn invalid_arguments(tool: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            detail: detail.into(),
        }
    }
}

/// One named input of a tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// JSON type (`string`, `integer`, ...)
    #[serde(rename = "type")]
    pub param_type: String,
    /// Description shown to the model
    pub description: String,
    /// Whether the model must supply it
    pub required: bool,
}

impl ToolParameter {
    /// A required string parameter
    pub fn required_string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: "string".to_string(),
            description: description.into(),
            required: true,
        }
    }

    /// An optional parameter of the given JSON type
    pub fn optional(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            required: false,
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self.param_type.as_str() {
            "string" => value.is_string(),
            "integer" => value.is_i64() || value.is_u64(),
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            "object" => value.is_object(),
            "array" => value.is_array(),
            _ => true,
        }
    }
}

/// Everything the model needs to know about a tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool name
    pub name: String,
    /// What the tool does
    pub description: String,
    /// Accepted inputs
    pub parameters: Vec<ToolParameter>,
}

impl ToolDescriptor {
    /// JSON-schema definition in the shape the provider expects
    pub fn to_definition(&self) -> ToolDefinition {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), schema::property(&p.param_type, &p.description)))
            .collect();
        let required = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        ToolDefinition::new(
            self.name.clone(),
            self.description.clone(),
            schema::object(Value::Object(properties), required),
        )
    }

    /// Check decoded arguments against the parameter list
    pub fn validate(&self, arguments: &Value) -> Result<(), ToolError> {
        let Some(object) = arguments.as_object() else {
            return Err(ToolError::invalid_arguments(
                &self.name,
                "expected a JSON object",
            ));
        };

        for param in &self.parameters {
            match object.get(&param.name) {
                None | Some(Value::Null) if param.required => {
                    return Err(ToolError::invalid_arguments(
                        &self.name,
                        format!("missing required parameter '{}'", param.name),
                    ));
                }
                Some(value) if !value.is_null() && !param.accepts(value) => {
                    return Err(ToolError::invalid_arguments(
                        &self.name,
                        format!("parameter '{}' must be of type {}", param.name, param.param_type),
                    ));
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// Trait for tools the model can call
///
/// Implementations report failures as [`ToolError`]; the registry turns them
/// into text so a failing tool never ends the conversation.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with validated arguments
    ///
    /// # Arguments
    ///
    /// * `arguments` - JSON object matching [`Tool::parameters`]
    ///
    /// # Returns
    ///
    /// Human-readable result text for the model
    async fn execute(&self, arguments: Value) -> Result<String, ToolError>;

    /// Get the tool's name
    ///
    /// Must be unique within a ToolRegistry
    fn name(&self) -> &str;

    /// Get the tool's description
    ///
    /// This description helps the LLM decide when to use this tool
    fn description(&self) -> &str;

    /// Get the tool's parameters
    fn parameters(&self) -> Vec<ToolParameter>;

    /// Full descriptor of this tool
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}
