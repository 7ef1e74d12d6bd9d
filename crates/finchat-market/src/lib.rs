//! Market-data and web-search tools for finchat
//!
//! Two HTTP clients back the tools the model can call:
//!
//! - [`AlphaVantageClient`] for company overviews, stock quotes and news with sentiment
//! - [`WebSearchClient`] for DuckDuckGo instant answers
//!
//! Every operation has a fail-soft form that renders failures into text, so a
//! slow or unavailable provider never ends a conversation.

pub mod api;
pub mod config;
pub mod error;
pub mod tools;

pub use api::{
    AlphaVantageClient, CompanyOverview, NewsArticle, SearchResult, StockQuote, WebSearchClient,
};
pub use config::MarketConfig;
pub use error::{MarketDataError, Result};
pub use tools::{
    CompanyOverviewTool, StockNewsTool, StockPriceTool, WebSearchTool, register_market_tools,
};
