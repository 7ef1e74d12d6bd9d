//! LLM provider abstraction layer for finchat
//!
//! This crate provides provider-agnostic abstractions for talking to a hosted
//! chat model. It includes:
//!
//! - Message types for conversation turns (including `tool` turns)
//! - Completion request/response types with tool-choice control
//! - Tool definitions for function calling
//! - Stream chunks for incremental answers
//! - Provider trait for LLM implementations
//! - An OpenAI-compatible provider (Groq by default, behind the `openai` feature)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod stream;
pub mod tools;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage, ToolChoice};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use stream::{ChunkStream, StreamChunk};
pub use tools::ToolDefinition;

// Provider implementations (feature-gated)
#[cfg(feature = "openai")]
pub mod providers;
