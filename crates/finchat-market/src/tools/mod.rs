//! Model-callable tools backed by the market-data clients

pub mod fundamental;
pub mod news;
pub mod price;
pub mod web_search;

pub use fundamental::CompanyOverviewTool;
pub use news::StockNewsTool;
pub use price::StockPriceTool;
pub use web_search::WebSearchTool;

use crate::api::{AlphaVantageClient, WebSearchClient};
use finchat_tools::ToolRegistry;
use std::sync::Arc;

/// Register the overview, price, news and web-search tools
pub fn register_market_tools(
    registry: &ToolRegistry,
    market: Arc<AlphaVantageClient>,
    search: Arc<WebSearchClient>,
) {
    registry.register(Arc::new(CompanyOverviewTool::new(market.clone())));
    registry.register(Arc::new(StockPriceTool::new(market.clone())));
    registry.register(Arc::new(StockNewsTool::new(market)));
    registry.register(Arc::new(WebSearchTool::new(search)));
}

/// Read a string argument the registry has already validated
pub(crate) fn string_arg<'a>(arguments: &'a serde_json::Value, name: &str) -> &'a str {
    arguments
        .get(name)
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
}
