//! Chat runtime for finchat
//!
//! This crate turns a user prompt into a streamed answer:
//!
//! - [`CompletionOrchestrator`] asks the model once with tools offered, runs
//!   at most one tool call and opens the streaming answer
//! - [`ResponseStreamer`] accumulates text chunks for incremental display
//! - [`ChatSession`] owns the conversation and the turn-failure policy
//! - [`SystemPrompt`] renders the system instructions

pub mod orchestrator;
pub mod prompts;
pub mod session;
pub mod streamer;

#[cfg(test)]
pub(crate) mod testing;

pub use orchestrator::{
    CompletionOrchestrator, OrchestratorConfig, PreparedTurn, ToolCallRequest, TurnPhase,
};
pub use prompts::SystemPrompt;
pub use session::{APOLOGY, ChatSession, GREETING, TurnOutcome};
pub use streamer::{NullRenderer, ResponseStreamer, StreamOutcome, StreamRenderer};
