//! DuckDuckGo Instant Answer client
//!
//! The instant-answer endpoint needs no key. It returns an abstract for well
//! known subjects, a short list of direct results and related topics, some of
//! them grouped under a heading.

use crate::config::MarketConfig;
use crate::error::{MarketDataError, Result};
use finchat_tools::truncate_chars;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Write as _;
use std::time::Duration;
use tracing::{debug, instrument};

/// One ranked web result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InstantAnswer {
    #[serde(rename = "Heading")]
    heading: String,
    #[serde(rename = "AbstractText")]
    abstract_text: String,
    #[serde(rename = "AbstractURL")]
    abstract_url: String,
    #[serde(rename = "AbstractSource")]
    abstract_source: String,
    #[serde(rename = "Results")]
    results: Vec<Topic>,
    #[serde(rename = "RelatedTopics")]
    related_topics: Vec<Topic>,
}

/// A result or related topic; groups carry nested `Topics`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Topic {
    #[serde(rename = "Text")]
    text: String,
    #[serde(rename = "FirstURL")]
    first_url: String,
    #[serde(rename = "Topics")]
    topics: Vec<Topic>,
}

impl Topic {
    fn flatten_into(self, out: &mut Vec<SearchResult>) {
        if !self.text.is_empty() {
            out.push(SearchResult {
                text: self.text,
                url: self.first_url,
            });
        }
        for topic in self.topics {
            topic.flatten_into(out);
        }
    }
}

impl InstantAnswer {
    /// Abstract first, then direct results, then related topics
    fn ranked(self) -> Vec<SearchResult> {
        let mut ranked = Vec::new();

        if !self.abstract_text.is_empty() {
            let text = if self.heading.is_empty() {
                self.abstract_text
            } else {
                format!("{}: {}", self.heading, self.abstract_text)
            };
            let url = if self.abstract_url.is_empty() {
                self.abstract_source
            } else {
                self.abstract_url
            };
            ranked.push(SearchResult { text, url });
        }

        for topic in self.results.into_iter().chain(self.related_topics) {
            topic.flatten_into(&mut ranked);
        }

        ranked
    }
}

/// Web-search client
#[derive(Debug, Clone)]
pub struct WebSearchClient {
    client: Client,
    base_url: String,
    max_results: usize,
    max_chars: usize,
    timeout: Duration,
}

impl WebSearchClient {
    /// Create a client from the shared market configuration
    pub fn new(config: &MarketConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.search_base_url.clone(),
            max_results: config.search_max_results,
            max_chars: config.max_chars,
            timeout: config.request_timeout,
        })
    }

    /// Ranked results for `query`, at most the configured number
    #[instrument(skip(self))]
    pub async fn search_results(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(MarketDataError::EmptyQuery);
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(MarketDataError::HttpStatus(response.status()));
        }

        // Served as application/x-javascript, so decode the bytes directly
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        let answer: InstantAnswer = serde_json::from_slice(&body)?;

        let mut results = answer.ranked();
        results.truncate(self.max_results);

        debug!(results = results.len(), "Received search results");
        Ok(results)
    }

    fn transport_error(&self, err: reqwest::Error) -> MarketDataError {
        if err.is_timeout() {
            MarketDataError::Timeout(self.timeout)
        } else {
            MarketDataError::NetworkError(err)
        }
    }

    /// Search results rendered for the model
    pub async fn search_text(&self, query: &str) -> Result<String> {
        let results = self.search_results(query).await?;
        let query = query.trim();

        if results.is_empty() {
            return Ok(format!("No results found for \"{query}\"."));
        }

        let mut text = format!("Web results for \"{query}\":");
        for (rank, result) in results.iter().enumerate() {
            let _ = write!(text, "\n{}. {}", rank + 1, result.text);
            if !result.url.is_empty() {
                let _ = write!(text, "\n   Source: {}", result.url);
            }
        }

        Ok(truncate_chars(&text, self.max_chars))
    }

    /// Fail-soft search; errors become descriptive text
    pub async fn search(&self, query: &str) -> String {
        self.search_text(query).await.unwrap_or_else(|e| {
            format!("Error searching the web for \"{}\": {e}", query.trim())
        })
    }
}
