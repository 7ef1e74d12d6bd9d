//! Single-shot tool orchestration
//!
//! One chat turn runs through these phases:
//! 1. Ask the model once, non-streaming, with every registered tool offered
//! 2. If it requests a tool, run the first requested call through the registry
//!    and append the call and its result to the conversation
//! 3. Ask again as a stream, with no tools offered, and hand the stream back
//!
//! The second request is never checked for further tool calls.

use crate::prompts::SystemPrompt;
use finchat_core::{Error, Result};
use finchat_llm::{
    ChunkStream, CompletionRequest, ContentBlock, LLMError, LLMProvider, Message, StreamChunk,
    ToolChoice,
};
use finchat_tools::ToolRegistry;
use futures::{StreamExt, future, stream};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Model parameters used for both requests of a turn
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Model to use
    pub model: String,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature
    pub temperature: Option<f32>,

    /// System prompt prepended to every request
    pub system_prompt: SystemPrompt,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            model: "llama-3.3-70b-versatile".to_string(),
            max_tokens: 1024,
            temperature: None,
            system_prompt: SystemPrompt::default(),
        }
    }
}

/// Where a turn currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitingFirstCompletion,
    ToolCallRequested,
    DirectAnswer,
    StreamingFinalAnswer,
    Done,
}

impl TurnPhase {
    /// Phase that follows the first completion
    pub fn route(first_response: &Message) -> Self {
        if first_response.has_tool_uses() {
            Self::ToolCallRequested
        } else {
            Self::DirectAnswer
        }
    }
}

/// A decoded tool call, consumed once
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub id: String,
    pub tool_name: String,
    pub arguments: Value,
}

impl ToolCallRequest {
    /// Decode the first tool call of a model message, if any
    ///
    /// An empty argument string counts as `{}`; anything else must be valid JSON.
    pub fn first_in(message: &Message) -> Result<Option<Self>> {
        let tool_uses = message.tool_uses();
        if tool_uses.len() > 1 {
            warn!(
                requested = tool_uses.len(),
                "Model requested several tool calls, only the first is executed"
            );
        }

        let Some(ContentBlock::ToolUse {
            id,
            name,
            arguments,
        }) = tool_uses.into_iter().next()
        else {
            return Ok(None);
        };

        let arguments = if arguments.trim().is_empty() {
            Value::Object(Map::new())
        } else {
            serde_json::from_str(arguments).map_err(|e| Error::MalformedToolArguments {
                tool: name.clone(),
                detail: e.to_string(),
            })?
        };

        Ok(Some(Self {
            id: id.clone(),
            tool_name: name.clone(),
            arguments,
        }))
    }
}

/// A turn whose final answer is ready to stream
pub struct PreparedTurn {
    /// `ToolCallRequested` or `DirectAnswer`
    pub route: TurnPhase,

    /// The executed tool call, if any
    pub tool_call: Option<ToolCallRequest>,

    /// Assistant tool-call echo and `tool` result, in conversation order
    pub tool_turns: Vec<Message>,

    /// Final answer, prefixed with a `ToolEvent` when a tool ran
    pub stream: ChunkStream,
}

impl std::fmt::Debug for PreparedTurn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedTurn")
            .field("route", &self.route)
            .field("tool_call", &self.tool_call)
            .field("tool_turns", &self.tool_turns.len())
            .finish_non_exhaustive()
    }
}

/// Runs the tool-augmented single-turn completion
///
/// Shared across sessions and requests through `Arc`; holds no per-turn state.
pub struct CompletionOrchestrator {
    provider: Arc<dyn LLMProvider>,
    registry: Arc<ToolRegistry>,
    config: OrchestratorConfig,
}

impl CompletionOrchestrator {
    /// Create a new orchestrator
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        registry: Arc<ToolRegistry>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            provider,
            registry,
            config,
        }
    }

    /// The tool registry offered to the model
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Get the current configuration
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    fn request(&self, messages: Vec<Message>, system: String) -> CompletionRequest {
        CompletionRequest::builder(&self.config.model)
            .messages(messages)
            .system(system)
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .build()
    }

    /// Run phases 1 to 3 for a conversation ending with the user's prompt
    ///
    /// # Returns
    ///
    /// The prepared turn holding the answer stream; failures before the
    /// stream opens are turn-level errors.
    #[instrument(skip_all, fields(turn_id = %Uuid::new_v4(), provider = %self.provider.name()))]
    pub async fn run(&self, history: &[Message]) -> Result<PreparedTurn> {
        let definitions = self.registry.definitions();
        let tool_names: Vec<String> = definitions.iter().map(|d| d.name.clone()).collect();
        let system = self.config.system_prompt.render(&tool_names)?;

        if let Some(last) = history.last() {
            let preview: String = last.text().unwrap_or("").chars().take(200).collect();
            debug!(role = ?last.role, message_preview = %preview, "Processing message");
        }

        let mut first = self.request(history.to_vec(), system.clone());
        if !definitions.is_empty() {
            first.tools = Some(definitions);
            first.tool_choice = Some(ToolChoice::Auto);
        }

        info!(
            phase = ?TurnPhase::AwaitingFirstCompletion,
            model = %self.config.model,
            tool_count = tool_names.len(),
            "Sending request to LLM"
        );
        let response = self.provider.complete(first).await?;

        let route = TurnPhase::route(&response.message);
        info!(
            phase = ?route,
            stop_reason = ?response.stop_reason,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "LLM response received"
        );

        let tool_call = ToolCallRequest::first_in(&response.message)?;
        let mut tool_turns = Vec::new();

        if let Some(call) = &tool_call {
            let input_preview: String = call.arguments.to_string().chars().take(500).collect();
            info!(
                tool_name = %call.tool_name,
                tool_id = %call.id,
                input_preview = %input_preview,
                "Executing tool"
            );

            let result = self
                .registry
                .invoke(&call.tool_name, call.arguments.clone())
                .await?;

            let result_preview: String = result.text.chars().take(300).collect();
            debug!(
                tool_name = %call.tool_name,
                result_length = result.text.chars().count(),
                result_preview = %result_preview,
                "Tool result"
            );

            tool_turns.push(Message::assistant_tool_call(
                &call.id,
                &call.tool_name,
                call.arguments.to_string(),
            ));
            tool_turns.push(Message::tool(&call.id, &call.tool_name, result.text));
        }

        let mut messages = history.to_vec();
        messages.extend(tool_turns.iter().cloned());

        info!(phase = ?TurnPhase::StreamingFinalAnswer, "Requesting final answer");
        let answer = self.provider.stream(self.request(messages, system)).await?;

        let stream = match &tool_call {
            Some(call) => {
                let event = StreamChunk::tool_event(call.tool_name.clone());
                stream::once(future::ready(Ok::<_, LLMError>(event)))
                    .chain(answer)
                    .boxed()
            }
            None => answer,
        };

        Ok(PreparedTurn {
            route,
            tool_call,
            tool_turns,
            stream,
        })
    }
}
