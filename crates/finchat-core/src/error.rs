//! Error types for finchat-core

use thiserror::Error;

/// Result type alias for turn-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// Turn-level failures
///
/// Any of these abandons the current chat turn. Tool-level failures never show
/// up here: the tool registry turns them into result text.
#[derive(Error, Debug)]
pub enum Error {
    /// The model provider could not produce a completion
    #[error("Model request failed: {0}")]
    Llm(String),

    /// The model asked for a tool that is not registered
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// The model sent a tool call whose argument payload is not valid JSON
    #[error("Malformed arguments for tool '{tool}': {detail}")]
    MalformedToolArguments {
        /// Name of the requested tool
        tool: String,
        /// Decoder error
        detail: String,
    },

    /// The system prompt template could not be rendered
    #[error("Prompt rendering failed: {0}")]
    Prompt(String),

    /// The streaming transport failed after the answer started
    #[error("Stream failed: {0}")]
    Stream(String),

    /// Required configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),
}
