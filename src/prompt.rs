//! Fallback prompt construction.

use serde::{Deserialize, Serialize};

/// One prior turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

const PREAMBLE: &str = "The internal technical knowledge base could not provide an exact answer to this question.
You are acting as an IT support assistant. Please follow these rules when responding:
- If you're unsure about the answer, do not hallucinate.
- It's okay to say 'I'm not sure about this. Please contact the relevant department.'
- Be concise and avoid over-explaining things you're unsure about.
- Maintain a helpful and professional tone.

Conversation so far:
";

/// Render the IT-support fallback prompt for `question`.
///
/// Each history turn becomes a `User:` or `Assistant:` line; any role other
/// than `user` is rendered as the assistant.
pub fn build_prompt(question: &str, history: &[ChatMessage]) -> String {
    let mut prompt = String::from(PREAMBLE);
    for message in history {
        let speaker = if message.role.eq_ignore_ascii_case("user") {
            "User"
        } else {
            "Assistant"
        };
        prompt.push_str(speaker);
        prompt.push_str(": ");
        prompt.push_str(&message.content);
        prompt.push('\n');
    }
    prompt.push_str("User question:\n");
    prompt.push_str(question);
    prompt
}
