//! Tool for fetching a company overview

use crate::api::AlphaVantageClient;
use crate::api::alpha_vantage::display_ticker;
use async_trait::async_trait;
use finchat_tools::{Tool, ToolError, ToolParameter};
use serde_json::Value;
use std::sync::Arc;

/// Company overview and fundamentals from Alpha Vantage
pub struct CompanyOverviewTool {
    client: Arc<AlphaVantageClient>,
}

impl CompanyOverviewTool {
    /// Create a new company overview tool
    pub fn new(client: Arc<AlphaVantageClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CompanyOverviewTool {
    async fn execute(&self, arguments: Value) -> Result<String, ToolError> {
        let ticker = super::string_arg(&arguments, "ticker");
        self.client.overview_text(ticker).await.map_err(|e| {
            ToolError::failed(
                format!("getting company overview for {}", display_ticker(ticker)),
                e,
            )
        })
    }

    fn name(&self) -> &str {
        "get_company_overview"
    }

    fn description(&self) -> &str {
        "Get the company overview and fundamentals for a stock ticker: \
         description, sector, market capitalization, valuation ratios, \
         dividends and analyst target price."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![ToolParameter::required_string(
            "ticker",
            "The stock ticker symbol (e.g., 'NVDA')",
        )]
    }
}
