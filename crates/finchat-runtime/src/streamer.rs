//! Response streaming
//!
//! The streamer folds a [`ChunkStream`] into a single answer while a renderer
//! shows progress. Renderers always receive the full text so far, never a
//! delta, so showing the same buffer twice is harmless.

use finchat_core::Error;
use finchat_llm::{ChunkStream, StreamChunk};
use futures::StreamExt;
use tracing::{debug, warn};

/// Receives progress while an answer streams in
pub trait StreamRenderer: Send {
    /// Show the accumulated answer text
    fn render(&mut self, text: &str);

    /// A tool is running on behalf of the answer
    fn tool_activity(&mut self, _tool_name: &str) {}
}

/// Renderer that shows nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl StreamRenderer for NullRenderer {
    fn render(&mut self, _text: &str) {}
}

/// How a stream ended
#[derive(Debug)]
pub enum StreamOutcome {
    /// The stream ran to its end
    Complete(String),

    /// The transport failed after `partial` had arrived
    Interrupted { partial: String, error: Error },
}

impl StreamOutcome {
    /// Text received, complete or not
    pub fn text(&self) -> &str {
        match self {
            Self::Complete(text) | Self::Interrupted { partial: text, .. } => text,
        }
    }

    /// Whether the stream ended normally
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }
}

/// Accumulates text chunks in arrival order
#[derive(Debug, Default)]
pub struct ResponseStreamer {
    buffer: String,
    text_chunks: usize,
}

impl ResponseStreamer {
    /// Create an empty streamer
    pub fn new() -> Self {
        Self::default()
    }

    /// Characters of answer text received so far
    pub fn received_chars(&self) -> usize {
        self.buffer.chars().count()
    }

    /// Apply one chunk
    pub fn accept(&mut self, chunk: StreamChunk, renderer: &mut dyn StreamRenderer) {
        match chunk {
            StreamChunk::Text(text) => {
                self.buffer.push_str(&text);
                self.text_chunks += 1;
                renderer.render(&self.buffer);
            }
            StreamChunk::ToolEvent { tool_name } => {
                debug!(tool = %tool_name, "Tool activity");
                renderer.tool_activity(&tool_name);
            }
            StreamChunk::Metadata { finish_reason, .. } => {
                if let Some(reason) = finish_reason {
                    debug!(finish_reason = %reason, "Stream finished");
                }
            }
        }
    }

    /// Consume `stream` to its end or its first error
    pub async fn drain(
        mut self,
        mut stream: ChunkStream,
        renderer: &mut dyn StreamRenderer,
    ) -> StreamOutcome {
        while let Some(item) = stream.next().await {
            match item {
                Ok(chunk) => self.accept(chunk, renderer),
                Err(e) => {
                    warn!(
                        error = %e,
                        received_chars = self.received_chars(),
                        "Answer stream interrupted"
                    );
                    return StreamOutcome::Interrupted {
                        partial: self.buffer,
                        error: e.into(),
                    };
                }
            }
        }

        debug!(
            text_chunks = self.text_chunks,
            chars = self.received_chars(),
            "Answer stream complete"
        );
        StreamOutcome::Complete(self.buffer)
    }
}
