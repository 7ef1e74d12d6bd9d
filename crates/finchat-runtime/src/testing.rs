//! Scripted provider and tools shared by the runtime tests

use async_trait::async_trait;
use finchat_llm::{
    ChunkStream, CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider,
    Message, MessageContent, Role, StopReason, StreamChunk, TokenUsage,
};
use finchat_tools::{Tool, ToolError, ToolParameter, ToolRegistry};
use futures::StreamExt;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Which provider entry point a request went through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Complete,
    Stream,
}

type ScriptedStream = Result<Vec<Result<StreamChunk, LLMError>>, LLMError>;

/// Plays back canned completions and streams, recording every request
#[derive(Default)]
pub struct ScriptedProvider {
    completions: Mutex<VecDeque<Result<CompletionResponse, LLMError>>>,
    streams: Mutex<VecDeque<ScriptedStream>>,
    pub requests: Mutex<Vec<(Call, CompletionRequest)>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn complete_with(self, response: Result<CompletionResponse, LLMError>) -> Self {
        self.completions.lock().unwrap().push_back(response);
        self
    }

    pub fn stream_with(self, chunks: Vec<Result<StreamChunk, LLMError>>) -> Self {
        self.streams.lock().unwrap().push_back(Ok(chunks));
        self
    }

    pub fn stream_fails(self, error: LLMError) -> Self {
        self.streams.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.requests.lock().unwrap().iter().map(|(c, _)| *c).collect()
    }

    pub fn request(&self, index: usize) -> CompletionRequest {
        self.requests.lock().unwrap()[index].1.clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> finchat_llm::Result<CompletionResponse> {
        self.requests.lock().unwrap().push((Call::Complete, request));
        self.completions
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected complete() call")
    }

    async fn stream(&self, request: CompletionRequest) -> finchat_llm::Result<ChunkStream> {
        self.requests.lock().unwrap().push((Call::Stream, request));
        let chunks = self
            .streams
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected stream() call")?;
        Ok(futures::stream::iter(chunks).boxed())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

pub fn text_response(text: &str) -> Result<CompletionResponse, LLMError> {
    Ok(CompletionResponse {
        message: Message::assistant(text),
        stop_reason: StopReason::EndTurn,
        usage: TokenUsage::default(),
    })
}

pub fn tool_calls_response(calls: &[(&str, &str, &str)]) -> Result<CompletionResponse, LLMError> {
    let blocks = calls
        .iter()
        .map(|(id, name, arguments)| ContentBlock::ToolUse {
            id: (*id).to_string(),
            name: (*name).to_string(),
            arguments: (*arguments).to_string(),
        })
        .collect();

    Ok(CompletionResponse {
        message: Message {
            role: Role::Assistant,
            content: Some(MessageContent::Blocks(blocks)),
            tool_call_id: None,
            tool_name: None,
        },
        stop_reason: StopReason::ToolUse,
        usage: TokenUsage::default(),
    })
}

pub fn tool_call_response(
    id: &str,
    name: &str,
    arguments: &str,
) -> Result<CompletionResponse, LLMError> {
    tool_calls_response(&[(id, name, arguments)])
}

/// `get_company_overview` call for `ticker`
pub fn overview_call(ticker: &str) -> Result<CompletionResponse, LLMError> {
    let arguments = serde_json::json!({ "ticker": ticker }).to_string();
    tool_call_response("call_1", "get_company_overview", &arguments)
}

pub fn text_chunks(parts: &[&str]) -> Vec<Result<StreamChunk, LLMError>> {
    parts.iter().map(|p| Ok(StreamChunk::text(*p))).collect()
}

/// Overview tool answering from a fixed record
pub struct FixedOverviewTool;

#[async_trait]
impl Tool for FixedOverviewTool {
    async fn execute(&self, arguments: Value) -> Result<String, ToolError> {
        let ticker = arguments["ticker"].as_str().unwrap_or_default();
        Ok(format!(
            "Company Overview for {ticker}:\n**Symbol**: {ticker}\n\
             **MarketCapitalization**: 780000000000"
        ))
    }

    fn name(&self) -> &str {
        "get_company_overview"
    }

    fn description(&self) -> &str {
        "Company overview"
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![ToolParameter::required_string("ticker", "Ticker")]
    }
}

/// Overview tool whose provider always times out
pub struct TimingOutOverviewTool;

#[async_trait]
impl Tool for TimingOutOverviewTool {
    async fn execute(&self, arguments: Value) -> Result<String, ToolError> {
        let ticker = arguments["ticker"].as_str().unwrap_or_default();
        Err(ToolError::failed(
            format!("getting company overview for {ticker}"),
            "Request timed out after 20s",
        ))
    }

    fn name(&self) -> &str {
        "get_company_overview"
    }

    fn description(&self) -> &str {
        "Company overview"
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![ToolParameter::required_string("ticker", "Ticker")]
    }
}

pub fn registry_with(tool: Arc<dyn Tool>) -> Arc<ToolRegistry> {
    let registry = ToolRegistry::new();
    registry.register(tool);
    Arc::new(registry)
}

/// Renderer that records everything it is shown
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub renders: Vec<String>,
    pub activities: Vec<String>,
}

impl crate::StreamRenderer for RecordingRenderer {
    fn render(&mut self, text: &str) {
        self.renders.push(text.to_string());
    }

    fn tool_activity(&mut self, tool_name: &str) {
        self.activities.push(tool_name.to_string());
    }
}
