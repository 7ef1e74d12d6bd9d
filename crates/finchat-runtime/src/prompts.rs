//! System prompt rendering

use finchat_core::{Error, Result};
use minijinja::{Environment, context};

const DEFAULT_ROLE: &str = "You are a world-class financial analyst and research assistant. \
    You answer questions about companies, stocks and markets using your tools for \
    real-time financial data and web search.";

const DEFAULT_INSTRUCTIONS: [&str; 2] = ["Always include sources", "Use tables to display data"];

const SYSTEM_TEMPLATE: &str = "\
{{ role }}
{% if tools %}
Available tools: {{ tools | join(\", \") }}. Call at most one tool per question, \
and only when the answer needs fresh data.
{% endif %}
Instructions:
{% for instruction in instructions %}- {{ instruction }}
{% endfor %}
Format answers in markdown.";

/// Role line plus instruction list, rendered with MiniJinja
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrompt {
    role: String,
    instructions: Vec<String>,
}

impl Default for SystemPrompt {
    fn default() -> Self {
        Self {
            role: DEFAULT_ROLE.to_string(),
            instructions: DEFAULT_INSTRUCTIONS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl SystemPrompt {
    /// Create a prompt with a custom role and no instructions
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            instructions: Vec::new(),
        }
    }

    /// Append an instruction
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instructions.push(instruction.into());
        self
    }

    /// Render the prompt for a request offering `tool_names`
    pub fn render(&self, tool_names: &[String]) -> Result<String> {
        let env = Environment::new();
        env.render_str(
            SYSTEM_TEMPLATE,
            context! {
                role => &self.role,
                tools => tool_names,
                instructions => &self.instructions,
            },
        )
        .map_err(|e| Error::Prompt(e.to_string()))
    }
}
