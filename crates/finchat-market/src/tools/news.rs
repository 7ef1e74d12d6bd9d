//! Tool for fetching recent news with sentiment

use crate::api::AlphaVantageClient;
use crate::api::alpha_vantage::display_ticker;
use async_trait::async_trait;
use finchat_tools::{Tool, ToolError, ToolParameter};
use serde_json::Value;
use std::sync::Arc;

/// Latest news articles and sentiment from Alpha Vantage
pub struct StockNewsTool {
    client: Arc<AlphaVantageClient>,
}

impl StockNewsTool {
    /// Create a new news tool
    pub fn new(client: Arc<AlphaVantageClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for StockNewsTool {
    async fn execute(&self, arguments: Value) -> Result<String, ToolError> {
        let ticker = super::string_arg(&arguments, "ticker");
        self.client.news_text(ticker).await.map_err(|e| {
            ToolError::failed(format!("getting news for {}", display_ticker(ticker)), e)
        })
    }

    fn name(&self) -> &str {
        "get_stock_news_and_sentiment"
    }

    fn description(&self) -> &str {
        "Get the latest news articles for a stock ticker, each with its source, \
         publication time, summary, URL and market sentiment."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![ToolParameter::required_string(
            "ticker",
            "The stock ticker symbol (e.g., 'NVDA')",
        )]
    }
}
