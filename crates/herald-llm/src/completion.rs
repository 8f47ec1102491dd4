//! Completion request and response types

use crate::{Message, Role};
use serde::{Deserialize, Serialize};

/// One chat-completion call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,

    /// System message first when present, then the user turns
    pub messages: Vec<Message>,

    pub max_tokens: usize,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, max_tokens: usize) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            max_tokens,
        }
    }

    /// Put a system message at the front, replacing any earlier one
    pub fn system(mut self, text: impl Into<String>) -> Self {
        self.messages.retain(|m| m.role != Role::System);
        self.messages.insert(0, Message::system(text));
        self
    }

    /// Append a user turn
    pub fn user(mut self, text: impl Into<String>) -> Self {
        self.messages.push(Message::user(text));
        self
    }

    /// Text of the last user turn
    pub fn prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    /// Text of the system message
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }
}

/// Why generation ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    #[default]
    Stop,
    /// Cut off by `max_tokens`
    Length,
    /// Withheld by the provider's content filter
    ContentFilter,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}

/// Generated answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub text: String,
    pub finish_reason: FinishReason,
    #[serde(default)]
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// A finished answer with no usage figures
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: FinishReason::Stop,
            usage: TokenUsage::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_building() {
        let request = CompletionRequest::new("gpt-4o-mini", 120)
            .user("What is a ranger?")
            .system("You are a game guide")
            .system("Answer in one sentence");

        assert_eq!(request.max_tokens, 120);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.system_prompt(), Some("Answer in one sentence"));
        assert_eq!(request.prompt(), Some("What is a ranger?"));
    }

    #[test]
    fn test_request_without_turns() {
        let request = CompletionRequest::new("m", 10);
        assert_eq!(request.prompt(), None);
        assert_eq!(request.system_prompt(), None);
    }
}
