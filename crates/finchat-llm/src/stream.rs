//! Incremental output of a streaming completion

use crate::{Result, TokenUsage};
use futures::stream::BoxStream;

/// One event of a streaming completion
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    /// A fragment of assistant text
    Text(String),

    /// A tool is being invoked on behalf of the answer
    ToolEvent {
        /// Name of the tool
        tool_name: String,
    },

    /// An event that carries no text (role announcements, finish reason, usage)
    Metadata {
        /// Finish reason reported by the provider, if any
        finish_reason: Option<String>,
        /// Token usage, when the provider reports it in-stream
        usage: Option<TokenUsage>,
    },
}

impl StreamChunk {
    /// Create a text chunk
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a tool event chunk
    pub fn tool_event(tool_name: impl Into<String>) -> Self {
        Self::ToolEvent {
            tool_name: tool_name.into(),
        }
    }

    /// Create an empty metadata chunk
    pub fn metadata() -> Self {
        Self::Metadata {
            finish_reason: None,
            usage: None,
        }
    }

    /// The textual payload, if this chunk has one
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::ToolEvent { .. } | Self::Metadata { .. } => None,
        }
    }
}

/// A finite, non-restartable sequence of stream chunks
pub type ChunkStream = BoxStream<'static, Result<StreamChunk>>;
