//! API clients for market data and web search

pub mod alpha_vantage;
pub mod duckduckgo;

pub use alpha_vantage::{
    AlphaVantageClient, CompanyOverview, NewsArticle, StockQuote, TickerSentiment,
};
pub use duckduckgo::{SearchResult, WebSearchClient};
