//! [`LLMProvider`](crate::LLMProvider) implementations
//!
//! Only the OpenAI-compatible wire format is needed: Groq, OpenAI and local
//! servers such as LM Studio all speak it.

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAIConfig, OpenAIProvider};
