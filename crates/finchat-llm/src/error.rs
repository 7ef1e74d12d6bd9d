//! Error types for model-provider calls

use thiserror::Error;

/// Result type for model-provider calls
pub type Result<T> = std::result::Result<T, LLMError>;

/// Failures talking to a chat-completions endpoint
#[derive(Error, Debug)]
pub enum LLMError {
    /// The provider answered with an unexpected HTTP status
    #[error("Provider request failed: {0}")]
    RequestFailed(String),

    /// 401 from the provider
    #[error("The provider rejected the API key")]
    AuthenticationFailed,

    /// 429 from the provider
    #[error("Provider rate limit reached: {0}")]
    RateLimitExceeded(String),

    /// 400 from the provider, usually a malformed tool schema or message order
    #[error("Provider rejected the request: {0}")]
    InvalidRequest(String),

    /// 404 from the provider
    #[error("Unknown model: {0}")]
    ModelNotFound(String),

    /// Connection, TLS or timeout failure
    #[cfg(feature = "openai")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The body did not have the expected shape
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// The streaming transport broke off or sent garbage
    #[error("Stream error: {0}")]
    StreamError(String),

    /// An error object sent in place of a stream chunk
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// The provider cannot be built from the given settings
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LLMError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, body: String, model: &str) -> Self {
        match status {
            401 => Self::AuthenticationFailed,
            429 => Self::RateLimitExceeded(body),
            400 => Self::InvalidRequest(body),
            404 => Self::ModelNotFound(model.to_string()),
            _ => Self::RequestFailed(format!("HTTP {status}: {body}")),
        }
    }
}

impl From<LLMError> for finchat_core::Error {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::StreamError(detail) => finchat_core::Error::Stream(detail),
            LLMError::ConfigurationError(detail) => finchat_core::Error::Configuration(detail),
            other => finchat_core::Error::Llm(other.to_string()),
        }
    }
}
