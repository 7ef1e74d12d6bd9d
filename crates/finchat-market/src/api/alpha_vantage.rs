//! Alpha Vantage API client

use crate::config::MarketConfig;
use crate::error::{MarketDataError, Result};
use chrono::NaiveDateTime;
use finchat_tools::truncate_chars;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const PROVIDER_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    config: Arc<MarketConfig>,
}

/// Company overview record, fields in provider order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyOverview {
    pub ticker: String,
    pub fields: Vec<(String, String)>,
}

impl CompanyOverview {
    fn from_record(ticker: &str, record: Map<String, Value>) -> Self {
        let fields = record
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect();

        Self {
            ticker: ticker.to_string(),
            fields,
        }
    }

    /// Value of one provider field, e.g. `MarketCapitalization`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render as `**Key**: Value` lines under a heading
    pub fn render(&self) -> String {
        let mut out = format!("Company Overview for {}:", self.ticker);
        for (key, value) in &self.fields {
            let _ = write!(out, "\n**{key}**: {value}");
        }
        out
    }
}

/// Sentiment for one ticker mentioned in an article
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TickerSentiment {
    pub ticker: String,
    pub relevance_score: String,
    pub ticker_sentiment_score: String,
    pub ticker_sentiment_label: String,
}

/// News article with sentiment
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewsArticle {
    pub title: String,
    pub url: String,
    pub time_published: String,
    pub summary: String,
    pub source: String,
    pub overall_sentiment_score: Option<f64>,
    pub overall_sentiment_label: String,
    pub ticker_sentiment: Vec<TickerSentiment>,
}

impl NewsArticle {
    /// Publication time as `YYYY-MM-DD HH:MM`, or the raw value if unparsable
    pub fn published(&self) -> String {
        NaiveDateTime::parse_from_str(&self.time_published, PROVIDER_TIME_FORMAT).map_or_else(
            |_| self.time_published.clone(),
            |t| t.format("%Y-%m-%d %H:%M").to_string(),
        )
    }

    /// Overall sentiment plus the label for `ticker`, when tagged
    pub fn sentiment_for(&self, ticker: &str) -> String {
        let mut sentiment = if self.overall_sentiment_label.is_empty() {
            "n/a".to_string()
        } else {
            self.overall_sentiment_label.clone()
        };

        if let Some(score) = self.overall_sentiment_score {
            let _ = write!(sentiment, " ({score:.3})");
        }

        if let Some(tagged) = self
            .ticker_sentiment
            .iter()
            .find(|t| t.ticker.eq_ignore_ascii_case(ticker) && !t.ticker_sentiment_label.is_empty())
        {
            let _ = write!(sentiment, "; {ticker}: {}", tagged.ticker_sentiment_label);
        }

        sentiment
    }

    fn render(&self, ticker: &str) -> String {
        format!(
            concat!(
                "- **{}**\n",
                "  - Source: {}\n",
                "  - Published: {}\n",
                "  - Sentiment: {}\n",
                "  - Summary: {}\n",
                "  - URL: {}",
            ),
            self.title,
            self.source,
            self.published(),
            self.sentiment_for(ticker),
            self.summary,
            self.url,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
struct NewsSentimentResponse {
    #[serde(default)]
    feed: Vec<NewsArticle>,
}

/// Latest trading-day quote from `GLOBAL_QUOTE`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StockQuote {
    #[serde(rename = "01. symbol")]
    pub symbol: String,
    #[serde(rename = "02. open")]
    pub open: String,
    #[serde(rename = "03. high")]
    pub high: String,
    #[serde(rename = "04. low")]
    pub low: String,
    #[serde(rename = "05. price")]
    pub price: String,
    #[serde(rename = "06. volume")]
    pub volume: String,
    #[serde(rename = "07. latest trading day")]
    pub latest_trading_day: String,
    #[serde(rename = "08. previous close")]
    pub previous_close: String,
    #[serde(rename = "09. change")]
    pub change: String,
    #[serde(rename = "10. change percent")]
    pub change_percent: String,
}

impl StockQuote {
    /// Render as `**Key**: Value` lines under a heading
    pub fn render(&self, ticker: &str) -> String {
        format!(
            "Stock Price for {ticker}:\n**Price**: {}\n**Change**: {} ({})\n**Open**: {}\n\
             **High**: {}\n**Low**: {}\n**Previous Close**: {}\n**Volume**: {}\n\
             **Latest Trading Day**: {}",
            self.price,
            self.change,
            self.change_percent,
            self.open,
            self.high,
            self.low,
            self.previous_close,
            self.volume,
            self.latest_trading_day,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote", default)]
    quote: Option<StockQuote>,
}

/// Trim and upper-case a ticker symbol
pub fn normalize_ticker(raw: &str) -> Result<String> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(MarketDataError::InvalidTicker(raw.to_string()));
    }
    Ok(ticker)
}

impl AlphaVantageClient {
    /// Create a new client; the configured timeout applies to every request
    pub fn new(config: MarketConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// Run one query and check the payload for provider error keys
    async fn fetch(&self, params: &[(&str, &str)]) -> Result<Map<String, Value>> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(params)
            .query(&[("apikey", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(MarketDataError::HttpStatus(response.status()));
        }

        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        let data: Value = serde_json::from_slice(&body)?;

        let Value::Object(data) = data else {
            return Err(MarketDataError::AlphaVantageError(
                "unexpected response shape".to_string(),
            ));
        };

        if let Some(error) = data.get("Error Message") {
            return Err(MarketDataError::AlphaVantageError(value_text(error)));
        }

        for notice_key in ["Note", "Information"] {
            if let Some(note) = data.get(notice_key) {
                let notice = value_text(note);
                warn!(%notice, "Alpha Vantage returned a notice instead of data");
                return Err(MarketDataError::ProviderNotice(notice));
            }
        }

        Ok(data)
    }

    fn transport_error(&self, err: reqwest::Error) -> MarketDataError {
        if err.is_timeout() {
            MarketDataError::Timeout(self.config.request_timeout)
        } else {
            MarketDataError::NetworkError(err)
        }
    }

    /// Get company overview and fundamental data
    ///
    /// Returns `None` when the provider has no record for the ticker.
    #[instrument(skip(self))]
    pub async fn company_overview(&self, ticker: &str) -> Result<Option<CompanyOverview>> {
        let ticker = normalize_ticker(ticker)?;
        let data = self
            .fetch(&[("function", "OVERVIEW"), ("symbol", ticker.as_str())])
            .await?;

        debug!(fields = data.len(), "Received company overview");

        if data.is_empty() {
            return Ok(None);
        }

        Ok(Some(CompanyOverview::from_record(&ticker, data)))
    }

    /// Get the latest news articles with sentiment for a ticker
    #[instrument(skip(self))]
    pub async fn news_sentiment(&self, ticker: &str) -> Result<Vec<NewsArticle>> {
        let ticker = normalize_ticker(ticker)?;
        let limit = self.config.news_limit.to_string();
        let data = self
            .fetch(&[
                ("function", "NEWS_SENTIMENT"),
                ("tickers", ticker.as_str()),
                ("limit", limit.as_str()),
                ("sort", "LATEST"),
            ])
            .await?;

        let response: NewsSentimentResponse = serde_json::from_value(Value::Object(data))?;
        let mut feed = response.feed;
        feed.truncate(self.config.news_limit);

        debug!(articles = feed.len(), "Received news feed");
        Ok(feed)
    }

    /// Latest quote for a ticker
    ///
    /// Returns `None` when the provider knows no such symbol.
    #[instrument(skip(self))]
    pub async fn stock_quote(&self, ticker: &str) -> Result<Option<StockQuote>> {
        let ticker = normalize_ticker(ticker)?;
        let data = self
            .fetch(&[("function", "GLOBAL_QUOTE"), ("symbol", ticker.as_str())])
            .await?;

        let response: GlobalQuoteResponse = serde_json::from_value(Value::Object(data))?;
        let quote = response.quote.filter(|q| !q.price.is_empty());

        debug!(found = quote.is_some(), "Received quote");
        Ok(quote)
    }

    /// Quote rendered for the model
    pub async fn quote_text(&self, ticker: &str) -> Result<String> {
        let text = match self.stock_quote(ticker).await? {
            Some(quote) => quote.render(&display_ticker(ticker)),
            None => format!("No stock price found for {}.", display_ticker(ticker)),
        };
        Ok(truncate_chars(&text, self.config.max_chars))
    }

    /// Overview rendered for the model
    pub async fn overview_text(&self, ticker: &str) -> Result<String> {
        let text = match self.company_overview(ticker).await? {
            Some(overview) => overview.render(),
            None => format!("No company overview found for {}.", display_ticker(ticker)),
        };
        Ok(truncate_chars(&text, self.config.max_chars))
    }

    /// News feed rendered for the model
    pub async fn news_text(&self, ticker: &str) -> Result<String> {
        let feed = self.news_sentiment(ticker).await?;
        let ticker = display_ticker(ticker);

        if feed.is_empty() {
            return Ok(format!("No news found for {ticker}."));
        }

        let articles: Vec<String> = feed.iter().map(|a| a.render(&ticker)).collect();
        let text = format!("Latest News:\n{}", articles.join("\n"));
        Ok(truncate_chars(&text, self.config.max_chars))
    }

    /// Fail-soft company overview; errors become descriptive text
    pub async fn get_company_overview(&self, ticker: &str) -> String {
        self.overview_text(ticker).await.unwrap_or_else(|e| {
            format!(
                "Error getting company overview for {}: {e}",
                display_ticker(ticker)
            )
        })
    }

    /// Fail-soft stock price; errors become descriptive text
    pub async fn get_stock_price(&self, ticker: &str) -> String {
        self.quote_text(ticker).await.unwrap_or_else(|e| {
            format!("Error getting stock price for {}: {e}", display_ticker(ticker))
        })
    }

    /// Fail-soft news and sentiment; errors become descriptive text
    pub async fn get_stock_news_and_sentiment(&self, ticker: &str) -> String {
        self.news_text(ticker)
            .await
            .unwrap_or_else(|e| format!("Error getting news for {}: {e}", display_ticker(ticker)))
    }
}

/// Ticker as shown in messages: normalized when valid, raw otherwise
pub(crate) fn display_ticker(raw: &str) -> String {
    normalize_ticker(raw).unwrap_or_else(|_| raw.to_string())
}

fn value_text(value: &Value) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_string(), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;

    async fn spawn_fake(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/query")
    }

    fn client_for(base_url: String) -> AlphaVantageClient {
        AlphaVantageClient::new(MarketConfig::new("test_key").with_base_url(base_url)).unwrap()
    }

    async fn fake_provider(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        assert_eq!(params.get("apikey").map(String::as_str), Some("test_key"));

        match params.get("function").map(String::as_str) {
            Some("OVERVIEW") if params.get("symbol").map(String::as_str) == Some("TSLA") => {
                Json(json!({
                    "Symbol": "TSLA",
                    "Name": "Tesla Inc",
                    "MarketCapitalization": "780000000000",
                    "PERatio": "62.5"
                }))
            }
            Some("OVERVIEW") => Json(json!({})),
            Some("GLOBAL_QUOTE") if params.get("symbol").map(String::as_str) == Some("TSLA") => {
                Json(json!({
                    "Global Quote": {
                        "01. symbol": "TSLA",
                        "02. open": "245.1000",
                        "03. high": "251.3000",
                        "04. low": "244.0000",
                        "05. price": "248.5000",
                        "06. volume": "98123456",
                        "07. latest trading day": "2024-01-15",
                        "08. previous close": "245.3000",
                        "09. change": "3.2000",
                        "10. change percent": "1.3046%"
                    }
                }))
            }
            Some("GLOBAL_QUOTE") => Json(json!({"Global Quote": {}})),
            Some("NEWS_SENTIMENT") => {
                assert_eq!(params.get("sort").map(String::as_str), Some("LATEST"));
                assert_eq!(params.get("limit").map(String::as_str), Some("5"));
                if params.get("tickers").map(String::as_str) == Some("TSLA") {
                    Json(json!({
                        "items": "1",
                        "feed": [{
                            "title": "Tesla deliveries beat estimates",
                            "url": "https://example.com/tesla",
                            "time_published": "20240115T143000",
                            "summary": "Deliveries rose.",
                            "source": "Reuters",
                            "overall_sentiment_score": 0.2314,
                            "overall_sentiment_label": "Somewhat-Bullish",
                            "ticker_sentiment": [{
                                "ticker": "TSLA",
                                "relevance_score": "0.9",
                                "ticker_sentiment_score": "0.31",
                                "ticker_sentiment_label": "Bullish"
                            }]
                        }]
                    }))
                } else {
                    Json(json!({"items": "0", "feed": []}))
                }
            }
            _ => Json(json!({"Error Message": "Invalid API call."})),
        }
    }

    #[test]
    fn test_normalize_ticker() {
        assert_eq!(normalize_ticker(" tsla ").unwrap(), "TSLA");
        assert!(matches!(
            normalize_ticker("   "),
            Err(MarketDataError::InvalidTicker(_))
        ));
    }

    #[test]
    fn test_article_published_and_sentiment() {
        let article = NewsArticle {
            time_published: "20240115T143000".to_string(),
            overall_sentiment_label: "Neutral".to_string(),
            overall_sentiment_score: Some(0.05),
            ..NewsArticle::default()
        };
        assert_eq!(article.published(), "2024-01-15 14:30");
        assert_eq!(article.sentiment_for("TSLA"), "Neutral (0.050)");

        let raw = NewsArticle {
            time_published: "yesterday".to_string(),
            ..NewsArticle::default()
        };
        assert_eq!(raw.published(), "yesterday");
        assert_eq!(raw.sentiment_for("TSLA"), "n/a");
    }

    #[tokio::test]
    async fn test_overview_keeps_provider_order() {
        let base = spawn_fake(Router::new().route("/query", get(fake_provider))).await;
        let client = client_for(base);

        let text = client.get_company_overview("tsla").await;
        assert_eq!(
            text,
            "Company Overview for TSLA:\n**Symbol**: TSLA\n**Name**: Tesla Inc\n\
             **MarketCapitalization**: 780000000000\n**PERatio**: 62.5"
        );
    }

    #[tokio::test]
    async fn test_overview_empty_record() {
        let base = spawn_fake(Router::new().route("/query", get(fake_provider))).await;
        let client = client_for(base);

        assert_eq!(
            client.get_company_overview("ZZZZ").await,
            "No company overview found for ZZZZ."
        );
    }

    #[tokio::test]
    async fn test_stock_price_rendering() {
        let base = spawn_fake(Router::new().route("/query", get(fake_provider))).await;
        let client = client_for(base);

        let quote = client.stock_quote(" tsla").await.unwrap().unwrap();
        assert_eq!(quote.symbol, "TSLA");
        assert_eq!(quote.latest_trading_day, "2024-01-15");

        let text = client.get_stock_price("tsla").await;
        assert!(text.starts_with("Stock Price for TSLA:\n**Price**: 248.5000\n"));
        assert!(text.contains("**Change**: 3.2000 (1.3046%)"));
        assert!(text.contains("**Previous Close**: 245.3000"));
        assert!(text.ends_with("**Latest Trading Day**: 2024-01-15"));
    }

    #[tokio::test]
    async fn test_stock_price_unknown_symbol() {
        let base = spawn_fake(Router::new().route("/query", get(fake_provider))).await;
        let client = client_for(base);

        assert_eq!(client.get_stock_price("ZZZZ").await, "No stock price found for ZZZZ.");
    }

    #[tokio::test]
    async fn test_stock_price_provider_error_becomes_text() {
        let router = Router::new().route(
            "/query",
            get(|| async {
                Json(json!({
                    "Error Message": "Invalid API call. Please retry or visit the documentation."
                }))
            }),
        );
        let client = client_for(spawn_fake(router).await);

        let text = client.get_stock_price("TSLA").await;
        assert!(text.starts_with(
            "Error getting stock price for TSLA: Alpha Vantage error: Invalid API call."
        ));
    }

    #[tokio::test]
    async fn test_news_rendering() {
        let base = spawn_fake(Router::new().route("/query", get(fake_provider))).await;
        let client = client_for(base);

        let text = client.get_stock_news_and_sentiment("TSLA").await;
        assert!(text.starts_with("Latest News:\n- **Tesla deliveries beat estimates**"));
        assert!(text.contains("  - Source: Reuters"));
        assert!(text.contains("  - Published: 2024-01-15 14:30"));
        assert!(text.contains("  - Sentiment: Somewhat-Bullish (0.231); TSLA: Bullish"));
        assert!(text.contains("  - URL: https://example.com/tesla"));
    }

    #[tokio::test]
    async fn test_news_empty_feed() {
        let base = spawn_fake(Router::new().route("/query", get(fake_provider))).await;
        let client = client_for(base);

        assert_eq!(
            client.get_stock_news_and_sentiment("NVDA").await,
            "No news found for NVDA."
        );
    }

    #[tokio::test]
    async fn test_provider_notice_becomes_text() {
        let router = Router::new().route(
            "/query",
            get(|| async {
                Json(json!({
                    "Information": "Thank you for using Alpha Vantage! \
                                    Our standard API rate limit is 25 requests per day."
                }))
            }),
        );
        let client = client_for(spawn_fake(router).await);

        let text = client.get_stock_news_and_sentiment("TSLA").await;
        assert!(text.starts_with("Error getting news for TSLA: Alpha Vantage notice:"));
        assert!(text.contains("25 requests per day"));
    }

    #[tokio::test]
    async fn test_invalid_input_notice_is_not_called_a_limit() {
        let router = Router::new().route(
            "/query",
            get(|| async {
                Json(json!({
                    "Information": "Invalid inputs. Please refer to the API documentation \
                                    https://www.alphavantage.co/documentation#newsapi"
                }))
            }),
        );
        let client = client_for(spawn_fake(router).await);

        let text = client.get_stock_news_and_sentiment("XYZQ").await;
        assert!(
            text.starts_with("Error getting news for XYZQ: Alpha Vantage notice: Invalid inputs.")
        );
        assert!(!text.contains("limit"));
    }

    #[tokio::test]
    async fn test_http_error_becomes_text() {
        let router = Router::new().route(
            "/query",
            get(|| async { axum::http::StatusCode::SERVICE_UNAVAILABLE }),
        );
        let client = client_for(spawn_fake(router).await);

        let text = client.get_company_overview("TSLA").await;
        assert_eq!(
            text,
            "Error getting company overview for TSLA: HTTP error: 503 Service Unavailable"
        );
    }

    #[tokio::test]
    async fn test_timeout_becomes_text() {
        let router = Router::new().route(
            "/query",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({}))
            }),
        );
        let base = spawn_fake(router).await;
        let client = AlphaVantageClient::new(
            MarketConfig::new("test_key")
                .with_base_url(base)
                .with_timeout(Duration::from_millis(200)),
        )
        .unwrap();

        let text = client.get_company_overview("TSLA").await;
        assert_eq!(
            text,
            "Error getting company overview for TSLA: Request timed out after 200ms"
        );
    }

    #[tokio::test]
    async fn test_overview_truncated_to_budget() {
        let router = Router::new().route(
            "/query",
            get(|| async { Json(json!({"Description": "x".repeat(5000)})) }),
        );
        let client = AlphaVantageClient::new(
            MarketConfig::new("test_key")
                .with_base_url(spawn_fake(router).await)
                .with_max_chars(100),
        )
        .unwrap();

        let text = client.get_company_overview("TSLA").await;
        assert_eq!(text.chars().count(), 103);
        assert!(text.ends_with("..."));
    }

    #[tokio::test]
    async fn test_news_truncated_to_budget() {
        let router = Router::new().route(
            "/query",
            get(|| async {
                Json(json!({
                    "feed": [{
                        "title": "Tesla expands in Europe",
                        "source": "Handelsblatt",
                        "time_published": "20240115T143000",
                        "summary": "Überblick über Märkte ".repeat(300),
                        "url": "https://example.com/tesla-europe"
                    }]
                }))
            }),
        );
        let client = AlphaVantageClient::new(
            MarketConfig::new("test_key")
                .with_base_url(spawn_fake(router).await)
                .with_max_chars(120),
        )
        .unwrap();

        let text = client.get_stock_news_and_sentiment("TSLA").await;
        assert_eq!(text.chars().count(), 123);
        assert!(text.starts_with("Latest News:\n- **Tesla expands in Europe**"));
        assert!(text.ends_with("..."));
        assert!(!text.contains("https://example.com/tesla-europe"));
    }

    #[tokio::test]
    async fn test_empty_ticker_is_error_text() {
        let client = client_for("http://127.0.0.1:9/query".to_string());
        let text = client.get_company_overview("  ").await;
        assert!(text.starts_with("Error getting company overview for   : Invalid ticker symbol"));
    }

    #[tokio::test]
    #[ignore] // Requires API key and network access
    async fn test_live_company_overview() {
        let key = std::env::var("ALPHA_VANTAGE_API_KEY").unwrap();
        let client = AlphaVantageClient::new(MarketConfig::new(key)).unwrap();
        let overview = client.company_overview("AAPL").await.unwrap().unwrap();
        assert_eq!(overview.get("Symbol"), Some("AAPL"));
    }
}
