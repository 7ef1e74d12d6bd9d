//! Bounded tool output

use serde::{Deserialize, Serialize};

/// Appended to text cut at the character budget
pub const TRUNCATION_MARKER: &str = "...";

/// Cut `text` to at most `max_chars` characters, appending the marker when cut
///
/// Counts Unicode scalar values, so multi-byte characters are never split.
///
/// ```
/// use finchat_tools::truncate_chars;
///
/// assert_eq!(truncate_chars("abcdef", 3), "abc...");
/// assert_eq!(truncate_chars("abc", 3), "abc");
/// ```
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match cut_index(text, max_chars) {
        Some(cut) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
        None => text.to_string(),
    }
}

fn cut_index(text: &str, max_chars: usize) -> Option<usize> {
    text.char_indices().nth(max_chars).map(|(cut, _)| cut)
}

/// Text produced by one tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Result text, already within budget
    pub text: String,
    /// Whether the original text was cut
    pub truncated: bool,
}

impl ToolResult {
    /// Bound `text` to `max_chars`
    pub fn bounded(text: impl Into<String>, max_chars: usize) -> Self {
        let mut text = text.into();
        let truncated = match cut_index(&text, max_chars) {
            Some(cut) => {
                text.truncate(cut);
                text.push_str(TRUNCATION_MARKER);
                true
            }
            None => false,
        };
        Self { text, truncated }
    }
}

impl std::fmt::Display for ToolResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
