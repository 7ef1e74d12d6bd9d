//! Tool for fetching the latest stock price

use crate::api::AlphaVantageClient;
use crate::api::alpha_vantage::display_ticker;
use async_trait::async_trait;
use finchat_tools::{Tool, ToolError, ToolParameter};
use serde_json::Value;
use std::sync::Arc;

/// Latest trading-day quote from Alpha Vantage
pub struct StockPriceTool {
    client: Arc<AlphaVantageClient>,
}

impl StockPriceTool {
    pub fn new(client: Arc<AlphaVantageClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for StockPriceTool {
    async fn execute(&self, arguments: Value) -> Result<String, ToolError> {
        let ticker = super::string_arg(&arguments, "ticker");
        self.client.quote_text(ticker).await.map_err(|e| {
            ToolError::failed(format!("getting stock price for {}", display_ticker(ticker)), e)
        })
    }

    fn name(&self) -> &str {
        "get_stock_price"
    }

    fn description(&self) -> &str {
        "Get the latest stock price for a company, with the day's change, open, high, low, \
         previous close and volume."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![ToolParameter::required_string(
            "ticker",
            "The stock ticker symbol (e.g., 'TSLA')",
        )]
    }
}
