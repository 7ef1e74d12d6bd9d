//! Application configuration
//!
//! Settings are read once at start-up from the process environment (after an
//! optional `.env` file). Both API keys are required; every missing key is
//! reported at once so the user can fix the configuration in one pass.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Environment variable holding the model-provider key
pub const LLM_API_KEY_VAR: &str = "GROQ_API_KEY";
/// Environment variable holding the market-data key
pub const MARKET_API_KEY_VAR: &str = "ALPHA_VANTAGE_API_KEY";

const DEFAULT_LLM_API_BASE: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_MAX_TOKENS: usize = 1024;
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MARKET_BASE_URL: &str = "https://www.alphavantage.co/query";
const DEFAULT_MARKET_TIMEOUT_SECS: u64 = 20;
const DEFAULT_NEWS_LIMIT: usize = 5;
const DEFAULT_MAX_CHARS: usize = 3500;
const DEFAULT_SEARCH_MAX_RESULTS: usize = 5;
const DEFAULT_BIND: &str = "0.0.0.0:8000";

/// Configuration errors, detected before any chat turn runs
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// One or more required secrets are not set
    #[error(
        "Missing required configuration: {}. Set them in the environment or in a .env file.",
        .0.join(", ")
    )]
    MissingSecrets(Vec<String>),

    /// A setting is present but cannot be parsed
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Model provider settings
#[derive(Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: Option<f32>,
    pub timeout: Duration,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Market-data and web-search settings
#[derive(Clone)]
pub struct MarketSettings {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub news_limit: usize,
    pub max_chars: usize,
    pub search_max_results: usize,
}

impl std::fmt::Debug for MarketSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("news_limit", &self.news_limit)
            .field("max_chars", &self.max_chars)
            .field("search_max_results", &self.search_max_results)
            .finish()
    }
}

/// HTTP entry point settings
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub bind: SocketAddr,
}

/// Full application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmSettings,
    pub market: MarketSettings,
    pub server: ServerSettings,
}

impl AppConfig {
    /// Load configuration from `.env` (if present) and the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
            Err(e) => debug!(error = %e, "No .env file loaded"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Empty or whitespace-only values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let llm_key = get(LLM_API_KEY_VAR);
        let market_key = get(MARKET_API_KEY_VAR);

        let missing: Vec<String> = [
            (LLM_API_KEY_VAR, llm_key.is_none()),
            (MARKET_API_KEY_VAR, market_key.is_none()),
        ]
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| (*name).to_string())
        .collect();

        let (Some(llm_key), Some(market_key)) = (llm_key, market_key) else {
            return Err(ConfigError::MissingSecrets(missing));
        };

        let temperature = get("FINCHAT_TEMPERATURE")
            .map(|raw| parse_value::<f32>("FINCHAT_TEMPERATURE", &raw))
            .transpose()?;

        let llm = LlmSettings {
            api_key: llm_key,
            api_base: get("FINCHAT_LLM_API_BASE")
                .unwrap_or_else(|| DEFAULT_LLM_API_BASE.to_string()),
            model: get("FINCHAT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: parse_or(&get, "FINCHAT_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            temperature,
            timeout: Duration::from_secs(parse_or(
                &get,
                "FINCHAT_LLM_TIMEOUT_SECS",
                DEFAULT_LLM_TIMEOUT_SECS,
            )?),
        };

        let market = MarketSettings {
            api_key: market_key,
            base_url: get("ALPHA_VANTAGE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_MARKET_BASE_URL.to_string()),
            timeout: Duration::from_secs(parse_or(
                &get,
                "FINCHAT_MARKET_TIMEOUT_SECS",
                DEFAULT_MARKET_TIMEOUT_SECS,
            )?),
            news_limit: parse_or(&get, "FINCHAT_NEWS_LIMIT", DEFAULT_NEWS_LIMIT)?,
            max_chars: parse_or(&get, "FINCHAT_TOOL_RESULT_MAX_CHARS", DEFAULT_MAX_CHARS)?,
            search_max_results: parse_or(
                &get,
                "FINCHAT_SEARCH_MAX_RESULTS",
                DEFAULT_SEARCH_MAX_RESULTS,
            )?,
        };

        let bind_raw = get("FINCHAT_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let server = ServerSettings {
            bind: parse_value("FINCHAT_BIND", &bind_raw)?,
        };

        let config = Self {
            llm,
            market,
            server,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate value ranges that parsing alone does not catch
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("FINCHAT_MAX_TOKENS", self.llm.max_tokens),
            ("FINCHAT_NEWS_LIMIT", self.market.news_limit),
            ("FINCHAT_TOOL_RESULT_MAX_CHARS", self.market.max_chars),
            ("FINCHAT_SEARCH_MAX_RESULTS", self.market.search_max_results),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: "0".to_string(),
                    reason: "must be greater than 0".to_string(),
                });
            }
        }

        let timeouts = [
            ("FINCHAT_LLM_TIMEOUT_SECS", self.llm.timeout),
            ("FINCHAT_MARKET_TIMEOUT_SECS", self.market.timeout),
        ];
        for (key, timeout) in timeouts {
            if timeout.is_zero() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: "0".to_string(),
                    reason: "must be greater than 0".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}
