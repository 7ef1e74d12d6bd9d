//! Chat-completion requests and responses
//!
//! A request carries the whole conversation on every call; providers are
//! stateless between turns.

use crate::{Message, ToolDefinition};
use serde::{Deserialize, Serialize};

const DEFAULT_MAX_TOKENS: usize = 1024;

/// Whether the model may or must call a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    Auto,
    Required,
}

/// One call to a chat model
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    /// Sent ahead of `messages`
    pub system: Option<String>,
    pub max_tokens: usize,
    /// Provider default when unset
    pub temperature: Option<f32>,
    pub tools: Option<Vec<ToolDefinition>>,
    /// Ignored unless `tools` is non-empty
    pub tool_choice: Option<ToolChoice>,
}

impl CompletionRequest {
    pub fn builder(model: impl Into<String>) -> CompletionRequestBuilder {
        CompletionRequestBuilder::new(model)
    }

    /// Whether any tool is on offer
    pub fn offers_tools(&self) -> bool {
        self.tools.as_ref().is_some_and(|tools| !tools.is_empty())
    }
}

/// Non-streaming answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Text and/or tool-call blocks
    pub message: Message,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

/// Why generation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    /// Cut off by `max_tokens`
    MaxTokens,
    /// The message holds tool calls to run
    ToolUse,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl TokenUsage {
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

/// Builder for [`CompletionRequest`]
#[derive(Debug)]
pub struct CompletionRequestBuilder {
    request: CompletionRequest,
}

impl CompletionRequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            request: CompletionRequest {
                model: model.into(),
                messages: Vec::new(),
                system: None,
                max_tokens: DEFAULT_MAX_TOKENS,
                temperature: None,
                tools: None,
                tool_choice: None,
            },
        }
    }

    /// Replace the conversation
    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.request.messages = messages;
        self
    }

    pub fn add_message(mut self, message: Message) -> Self {
        self.request.messages.push(message);
        self
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.request.system = Some(system.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.request.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: Option<f32>) -> Self {
        self.request.temperature = temperature;
        self
    }

    /// Offer `tools` under the given policy
    pub fn tools(mut self, tools: Vec<ToolDefinition>, choice: ToolChoice) -> Self {
        self.request.tools = Some(tools);
        self.request.tool_choice = Some(choice);
        self
    }

    pub fn build(self) -> CompletionRequest {
        self.request
    }
}
