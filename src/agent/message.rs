//! Provider-agnostic message types for LLM communication.
//!
//! These types decouple role logic from any specific LLM SDK,
//! allowing the same roles to work across `OpenAI`-compatible backends.

use serde::{Deserialize, Serialize};

/// Role of a chat message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// System instructions.
    System,
    /// User input.
    User,
    /// Assistant response.
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who produced the message.
    pub speaker: Speaker,
    /// Message content.
    pub content: String,
}

/// A chat completion request (provider-agnostic).
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Model identifier (e.g., "gpt-4o").
    pub model: String,
    /// Ordered conversation messages.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature (0.0–2.0).
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Constrain the response to a single parseable JSON object.
    pub json_mode: bool,
}

/// Token usage statistics from a completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u32,
    /// Tokens generated in the completion.
    pub completion_tokens: u32,
    /// Total tokens used.
    pub total_tokens: u32,
}

/// A chat completion response (provider-agnostic).
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Generated text content.
    pub content: String,
    /// Token usage statistics.
    pub usage: TokenUsage,
    /// Finish reason from the model (e.g., `"stop"`, `"length"`).
    pub finish_reason: Option<String>,
}

/// Creates a system message.
#[must_use]
pub fn system_message(content: &str) -> ChatMessage {
    ChatMessage {
        speaker: Speaker::System,
        content: content.to_string(),
    }
}

/// Creates a user message.
#[must_use]
pub fn user_message(content: &str) -> ChatMessage {
    ChatMessage {
        speaker: Speaker::User,
        content: content.to_string(),
    }
}

/// Creates an assistant message.
#[must_use]
pub fn assistant_message(content: &str) -> ChatMessage {
    ChatMessage {
        speaker: Speaker::Assistant,
        content: content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_message() {
        let msg = system_message("You are helpful.");
        assert_eq!(msg.speaker, Speaker::System);
        assert_eq!(msg.content, "You are helpful.");
    }

    #[test]
    fn test_user_message() {
        let msg = user_message("Hello");
        assert_eq!(msg.speaker, Speaker::User);
        assert_eq!(msg.content, "Hello");
    }

    #[test]
    fn test_assistant_message() {
        let msg = assistant_message("repeat");
        assert_eq!(msg.speaker, Speaker::Assistant);
        assert_eq!(msg.content, "repeat");
    }

    #[test]
    fn test_speaker_serialization() {
        let json = serde_json::to_string(&Speaker::System).unwrap_or_default();
        assert_eq!(json, "\"system\"");

        let json = serde_json::to_string(&Speaker::Assistant).unwrap_or_default();
        assert_eq!(json, "\"assistant\"");
    }
}
