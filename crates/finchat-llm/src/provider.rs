//! The provider seam

use crate::{ChunkStream, CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// A hosted chat model
///
/// The runtime only talks to models through this trait, so tests swap in
/// scripted providers.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// One full answer, possibly holding tool calls
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// An answer delivered incrementally
    ///
    /// Errors before the first byte arrives (authentication, bad request) are
    /// returned directly; transport failures afterwards surface as `Err` items
    /// of the stream.
    async fn stream(&self, request: CompletionRequest) -> Result<ChunkStream>;

    /// Short name for logs, e.g. "groq"
    fn name(&self) -> &str;
}
