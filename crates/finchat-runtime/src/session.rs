//! Chat sessions
//!
//! A session owns one conversation. Each submitted prompt becomes a turn; a
//! failed turn is answered with a fixed apology so the conversation can go on.
//! A session built without a usable configuration is blocked and only ever
//! repeats the configuration problem.

use crate::orchestrator::{CompletionOrchestrator, TurnPhase};
use crate::streamer::{ResponseStreamer, StreamOutcome, StreamRenderer};
use finchat_core::Error;
use finchat_llm::Message;
use std::sync::Arc;
use tracing::{error, info};

/// First assistant turn of every session
pub const GREETING: &str = "Hi! How can I help you with your financial research today?";

/// Assistant turn recorded when a turn fails
pub const APOLOGY: &str = "Sorry, an error occurred. This can happen if the external data source \
    is slow or unavailable. Please try your request again in a moment.";

/// Result of one submitted prompt
#[derive(Debug)]
pub enum TurnOutcome {
    /// The answer streamed to completion
    Answered(String),

    /// The turn failed; `message` is what was recorded as the assistant turn
    Failed { message: String, error: Error },

    /// The session is blocked by a configuration error
    Blocked(String),
}

impl TurnOutcome {
    /// Text to show for this turn
    pub fn text(&self) -> &str {
        match self {
            Self::Answered(text) | Self::Failed { message: text, .. } | Self::Blocked(text) => {
                text
            }
        }
    }
}

enum SessionState {
    Ready(Arc<CompletionOrchestrator>),
    Blocked(String),
}

/// One conversation with its turn-failure policy
pub struct ChatSession {
    state: SessionState,
    history: Vec<Message>,
    diagnostics: bool,
}

impl ChatSession {
    /// Create a session answering through `orchestrator`
    pub fn new(orchestrator: Arc<CompletionOrchestrator>) -> Self {
        Self {
            state: SessionState::Ready(orchestrator),
            history: vec![Message::assistant(GREETING)],
            diagnostics: false,
        }
    }

    /// Create a session that refuses every prompt with `reason`
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            state: SessionState::Blocked(reason.into()),
            history: vec![Message::assistant(GREETING)],
            diagnostics: false,
        }
    }

    /// Append raw error text beneath the apology
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Conversation so far, starting with the greeting
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// The configuration problem, if the session is blocked
    pub fn blocked_reason(&self) -> Option<&str> {
        match &self.state {
            SessionState::Blocked(reason) => Some(reason),
            SessionState::Ready(_) => None,
        }
    }

    /// Drop the conversation and start again from the greeting
    pub fn clear(&mut self) {
        self.history.truncate(1);
    }

    /// Run one turn for `prompt`, streaming the answer to `renderer`
    pub async fn submit(&mut self, prompt: &str, renderer: &mut dyn StreamRenderer) -> TurnOutcome {
        let orchestrator = match &self.state {
            SessionState::Ready(orchestrator) => Arc::clone(orchestrator),
            SessionState::Blocked(reason) => {
                renderer.render(reason);
                return TurnOutcome::Blocked(reason.clone());
            }
        };

        self.history.push(Message::user(prompt));

        let prepared = match orchestrator.run(&self.history).await {
            Ok(prepared) => prepared,
            Err(e) => return self.fail(String::new(), e, renderer),
        };

        let outcome = ResponseStreamer::new()
            .drain(prepared.stream, renderer)
            .await;

        match outcome {
            StreamOutcome::Complete(text) => {
                self.history.extend(prepared.tool_turns);
                self.history.push(Message::assistant(text.clone()));
                info!(
                    phase = ?TurnPhase::Done,
                    route = ?prepared.route,
                    chars = text.chars().count(),
                    "Turn answered"
                );
                TurnOutcome::Answered(text)
            }
            StreamOutcome::Interrupted { partial, error } => self.fail(partial, error, renderer),
        }
    }

    /// Record the apology, after any partial answer, as the assistant turn
    fn fail(
        &mut self,
        partial: String,
        err: Error,
        renderer: &mut dyn StreamRenderer,
    ) -> TurnOutcome {
        error!(error = %err, partial_chars = partial.chars().count(), "Turn failed");

        let mut message = partial;
        if !message.is_empty() {
            message.push_str("\n\n");
        }
        message.push_str(APOLOGY);
        if self.diagnostics {
            message.push_str(&format!("\n\nDetails: {err}"));
        }

        renderer.render(&message);
        self.history.push(Message::assistant(message.clone()));
        TurnOutcome::Failed {
            message,
            error: err,
        }
    }
}
