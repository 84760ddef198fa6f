//! LLM driver abstraction.
//!
//! A driver takes the full session window (system prompt, messages, tool
//! descriptors) and returns one response. Drivers never retry: transport and
//! status failures are reported to the caller as-is.

use async_trait::async_trait;
use hearth_types::message::ContentBlock;
use hearth_types::message::Message;
use hearth_types::tool::{ToolCall, ToolDefinition};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a backend call.
#[derive(Error, Debug)]
pub enum LlmError {
    /// The request never completed (connect, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error body or message.
        message: String,
    },

    /// The backend answered with something we could not interpret.
    #[error("Parse error: {0}")]
    Parse(String),

    /// No API key was configured.
    #[error("Missing API key: set {0}")]
    MissingApiKey(String),
}

impl LlmError {
    /// Whether this is an authentication or authorization failure.
    pub fn is_auth(&self) -> bool {
        matches!(self, LlmError::Api { status: 401 | 403, .. } | LlmError::MissingApiKey(_))
    }
}

/// Why the backend stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model finished its turn.
    EndTurn,
    /// The model wants tool results before continuing.
    ToolUse,
    /// The response hit the token limit.
    MaxTokens,
    /// A stop sequence was generated.
    StopSequence,
}

/// Token accounting for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens.
    pub input_tokens: u64,
    /// Completion tokens.
    pub output_tokens: u64,
}

/// One request to the backend.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier.
    pub model: String,
    /// Static instructions plus the rendered memory block.
    pub system: String,
    /// The session window, oldest first.
    pub messages: Vec<Message>,
    /// Tools the model may call.
    pub tools: Vec<ToolDefinition>,
    /// Response token limit.
    pub max_tokens: u32,
}

/// One response from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Content blocks, in order.
    pub content: Vec<ContentBlock>,
    /// Why generation stopped.
    pub stop_reason: StopReason,
    /// Token accounting.
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Concatenated text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Every tool invocation in the response.
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolUse { id, name, input } => Some(ToolCall {
                    id: id.clone(),
                    name: name.clone(),
                    input: input.clone(),
                }),
                _ => None,
            })
            .collect()
    }
}

/// A backend capable of completing a conversation.
#[async_trait]
pub trait LlmDriver: Send + Sync {
    /// Send one request and wait for the full response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_accessors() {
        let resp = CompletionResponse {
            content: vec![
                ContentBlock::Text {
                    text: "Let me look.".into(),
                },
                ContentBlock::ToolUse {
                    id: "a".into(),
                    name: "calendar_get_events".into(),
                    input: serde_json::json!({"date": "today"}),
                },
                ContentBlock::ToolUse {
                    id: "b".into(),
                    name: "reminders_list".into(),
                    input: serde_json::json!({}),
                },
            ],
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        };
        assert_eq!(resp.text(), "Let me look.");
        let calls = resp.tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].id, "b");
    }

    #[test]
    fn test_auth_classification() {
        assert!(LlmError::Api {
            status: 401,
            message: "bad key".into()
        }
        .is_auth());
        assert!(!LlmError::Api {
            status: 500,
            message: "oops".into()
        }
        .is_auth());
        assert!(!LlmError::Http("timeout".into()).is_auth());
    }
}
