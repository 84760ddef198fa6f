//! In-memory session messages exchanged with the LLM backend.

use crate::tool::{ToolCall, ToolResult};
use serde::{Deserialize, Serialize};

/// Who authored a session message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The user (tool-result batches are also sent with this role).
    User,
    /// The assistant.
    Assistant,
}

/// One block of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Free text.
    Text {
        /// The text.
        text: String,
    },
    /// A tool invocation requested by the assistant.
    ToolUse {
        /// Invocation id, echoed back by the matching result.
        id: String,
        /// Tool name.
        name: String,
        /// Raw input parameters.
        input: serde_json::Value,
    },
    /// The result of an earlier invocation.
    ToolResult {
        /// The invocation this answers.
        tool_use_id: String,
        /// Result text.
        content: String,
        /// Whether the tool reported an error.
        #[serde(default)]
        is_error: bool,
    },
}

/// A role-tagged unit of the in-memory conversation window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Author.
    pub role: Role,
    /// Content blocks, in order.
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Plain user text.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// Plain assistant text.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// An assistant response carried verbatim (text and tool-use blocks).
    pub fn assistant_blocks(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// A batch of tool results answering one invocation request.
    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self {
            role: Role::User,
            content: results
                .into_iter()
                .map(|r| ContentBlock::ToolResult {
                    tool_use_id: r.tool_use_id,
                    content: r.content,
                    is_error: r.is_error,
                })
                .collect(),
        }
    }

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

    /// Tool invocations carried by this message.
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

    /// Ids of the tool results carried by this message.
    pub fn tool_result_ids(&self) -> Vec<&str> {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolResult { tool_use_id, .. } => Some(tool_use_id.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether this is an assistant message requesting tools.
    pub fn is_tool_request(&self) -> bool {
        self.role == Role::Assistant
            && self
                .content
                .iter()
                .any(|b| matches!(b, ContentBlock::ToolUse { .. }))
    }

    /// Whether this is a tool-result batch.
    pub fn is_tool_results(&self) -> bool {
        self.content
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolResult { .. }))
    }

    /// Whether this is a user message carrying only text.
    pub fn is_user_text(&self) -> bool {
        self.role == Role::User && !self.is_tool_results()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_request_classification() {
        let msg = Message::assistant_blocks(vec![
            ContentBlock::Text {
                text: "Checking.".into(),
            },
            ContentBlock::ToolUse {
                id: "tu_1".into(),
                name: "calendar_get_events".into(),
                input: serde_json::json!({}),
            },
        ]);
        assert!(msg.is_tool_request());
        assert!(!msg.is_user_text());
        assert_eq!(msg.text(), "Checking.");
        assert_eq!(msg.tool_calls().len(), 1);
        assert_eq!(msg.tool_calls()[0].name, "calendar_get_events");
    }

    #[test]
    fn test_tool_results_message() {
        let msg = Message::tool_results(vec![
            ToolResult::from_output("a", "ok".into()),
            ToolResult::from_output("b", "Error: denied".into()),
        ]);
        assert_eq!(msg.role, Role::User);
        assert!(msg.is_tool_results());
        assert!(!msg.is_user_text());
        assert_eq!(msg.tool_result_ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_content_block_wire_format() {
        let block = ContentBlock::ToolResult {
            tool_use_id: "x".into(),
            content: "done".into(),
            is_error: false,
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "tool_result");
        assert_eq!(json["tool_use_id"], "x");
    }
}
