//! Configuration for market-data clients

use crate::error::{MarketDataError, Result};
use finchat_utils::MarketSettings;
use std::time::Duration;

const DEFAULT_ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";
const DEFAULT_SEARCH_URL: &str = "https://api.duckduckgo.com/";

/// Settings shared by the Alpha Vantage and web-search clients
#[derive(Clone)]
pub struct MarketConfig {
    /// Alpha Vantage API key
    pub api_key: String,

    /// Alpha Vantage query endpoint
    pub base_url: String,

    /// DuckDuckGo instant-answer endpoint
    pub search_base_url: String,

    /// Timeout applied to every request
    pub request_timeout: Duration,

    /// Articles requested per news query
    pub news_limit: usize,

    /// Character budget of rendered text
    pub max_chars: usize,

    /// Results kept per web search
    pub search_max_results: usize,
}

impl std::fmt::Debug for MarketConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("search_base_url", &self.search_base_url)
            .field("request_timeout", &self.request_timeout)
            .field("news_limit", &self.news_limit)
            .field("max_chars", &self.max_chars)
            .field("search_max_results", &self.search_max_results)
            .finish()
    }
}

impl MarketConfig {
    /// Create a configuration with default endpoints and limits
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_ALPHA_VANTAGE_URL.to_string(),
            search_base_url: DEFAULT_SEARCH_URL.to_string(),
            request_timeout: Duration::from_secs(20),
            news_limit: 5,
            max_chars: 3500,
            search_max_results: 5,
        }
    }

    /// Set the Alpha Vantage endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the web-search endpoint
    pub fn with_search_base_url(mut self, url: impl Into<String>) -> Self {
        self.search_base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the number of news articles per request
    pub fn with_news_limit(mut self, limit: usize) -> Self {
        self.news_limit = limit;
        self
    }

    /// Set the character budget
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(MarketDataError::ConfigError(
                "Alpha Vantage API key must not be empty".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(MarketDataError::ConfigError(
                "request timeout must be greater than 0".to_string(),
            ));
        }

        if self.news_limit == 0 || self.search_max_results == 0 {
            return Err(MarketDataError::ConfigError(
                "result limits must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl From<&MarketSettings> for MarketConfig {
    fn from(settings: &MarketSettings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.clone(),
            search_base_url: DEFAULT_SEARCH_URL.to_string(),
            request_timeout: settings.timeout,
            news_limit: settings.news_limit,
            max_chars: settings.max_chars,
            search_max_results: settings.search_max_results,
        }
    }
}
