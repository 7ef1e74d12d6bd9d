//! Function declarations offered to the model

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A callable function as the model sees it
///
/// `parameters` is a JSON Schema object; it is sent as-is in the `tools`
/// array of a chat-completions request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// JSON Schema fragments for tool parameters
pub mod schema {
    use serde_json::{Value, json};

    /// An object schema
    ///
    /// ```
    /// use finchat_llm::tools::schema;
    /// use serde_json::json;
    ///
    /// let ticker = schema::object(
    ///     json!({ "ticker": schema::string("Stock ticker symbol, e.g. TSLA") }),
    ///     vec!["ticker"],
    /// );
    /// assert_eq!(ticker["required"][0], "ticker");
    /// ```
    pub fn object(properties: Value, required: Vec<&str>) -> Value {
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// A property of the given JSON type
    pub fn property(json_type: &str, description: &str) -> Value {
        json!({ "type": json_type, "description": description })
    }

    pub fn string(description: &str) -> Value {
        property("string", description)
    }
}
