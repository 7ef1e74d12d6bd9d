//! Message types for LLM communication
//!
//! A [`Message`] is one conversation turn. Assistant turns may carry
//! structured tool-use blocks; `tool` turns carry a tool's textual result and
//! reference the call they answer.

use serde::{Deserialize, Serialize};

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    /// Result of a tool call
    Tool,
}

/// Part of a structured assistant turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },

    /// The model asks for a tool to run
    ToolUse {
        /// Provider-issued call id, echoed by the `tool` turn
        id: String,
        name: String,
        /// JSON-encoded arguments exactly as the model produced them
        arguments: String,
    },
}

/// Plain text, or blocks when tool calls are involved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,

    /// For `tool` messages: the tool call this result answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// For `tool` messages: the tool that produced the result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl Message {
    fn with_text(role: Role, text: String) -> Self {
        Self {
            role,
            content: Some(MessageContent::Text(text)),
            tool_call_id: None,
            tool_name: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::with_text(Role::User, text.into())
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::with_text(Role::Assistant, text.into())
    }

    /// A `tool` turn answering call `tool_call_id`
    pub fn tool(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: Some(MessageContent::Text(result.into())),
            tool_call_id: Some(tool_call_id.into()),
            tool_name: Some(tool_name.into()),
        }
    }

    /// An assistant turn holding exactly one tool call
    pub fn assistant_tool_call(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(MessageContent::Blocks(vec![ContentBlock::ToolUse {
                id: id.into(),
                name: name.into(),
                arguments: arguments.into(),
            }])),
            tool_call_id: None,
            tool_name: None,
        }
    }

    /// The text of the turn, or its first text block
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Some(MessageContent::Text(s)) => Some(s),
            Some(MessageContent::Blocks(blocks)) => blocks.iter().find_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::ToolUse { .. } => None,
            }),
            None => None,
        }
    }

    /// Tool-use blocks, in the order the model sent them
    pub fn tool_uses(&self) -> Vec<&ContentBlock> {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .filter(|b| matches!(b, ContentBlock::ToolUse { .. }))
                .collect(),
            _ => vec![],
        }
    }

    pub fn has_tool_uses(&self) -> bool {
        !self.tool_uses().is_empty()
    }
}
