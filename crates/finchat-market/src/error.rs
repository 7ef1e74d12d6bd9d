//! Error types for market-data operations

use thiserror::Error;

/// Market-data and web-search errors
#[derive(Debug, Error)]
pub enum MarketDataError {
    /// Ticker symbol is empty after trimming
    #[error("Invalid ticker symbol: '{0}'")]
    InvalidTicker(String),

    /// Search query is empty after trimming
    #[error("Search query must not be empty")]
    EmptyQuery,

    /// The provider did not answer within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Alpha Vantage reported an error for the request
    #[error("Alpha Vantage error: {0}")]
    AlphaVantageError(String),

    /// Alpha Vantage answered with a `Note` or `Information` text instead of data
    #[error("Alpha Vantage notice: {0}")]
    ProviderNotice(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for market-data operations
pub type Result<T> = std::result::Result<T, MarketDataError>;
