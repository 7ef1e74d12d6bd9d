//! Tool for searching the web

use crate::api::WebSearchClient;
use async_trait::async_trait;
use finchat_tools::{Tool, ToolError, ToolParameter};
use serde_json::Value;
use std::sync::Arc;

/// DuckDuckGo instant-answer search
pub struct WebSearchTool {
    client: Arc<WebSearchClient>,
}

impl WebSearchTool {
    /// Create a new web-search tool
    pub fn new(client: Arc<WebSearchClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    async fn execute(&self, arguments: Value) -> Result<String, ToolError> {
        let query = super::string_arg(&arguments, "query");
        self.client.search_text(query).await.map_err(|e| {
            ToolError::failed(format!("searching the web for \"{}\"", query.trim()), e)
        })
    }

    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for information such as company background, events \
         and general context. Returns ranked results with their sources."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![ToolParameter::required_string(
            "query",
            "The search query",
        )]
    }
}
