//! Anthropic Messages API driver.
//!
//! Session messages already use the Messages API block shapes (`text`,
//! `tool_use`, `tool_result`), so requests serialize them directly.

use crate::llm_driver::{
    CompletionRequest, CompletionResponse, LlmDriver, LlmError, StopReason, TokenUsage,
};
use async_trait::async_trait;
use hearth_types::message::ContentBlock;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Default API base URL.
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Driver for the Anthropic Messages API.
pub struct AnthropicDriver {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicDriver {
    /// Create a driver with a fixed per-request timeout.
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Http(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| ANTHROPIC_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

/// Build the JSON body for `POST /v1/messages`.
pub fn build_request_body(request: &CompletionRequest) -> serde_json::Value {
    let tools: Vec<serde_json::Value> = request
        .tools
        .iter()
        .map(|t| {
            serde_json::json!({
                "name": t.name,
                "description": t.description,
                "input_schema": t.input_schema(),
            })
        })
        .collect();

    let mut body = serde_json::json!({
        "model": request.model,
        "max_tokens": request.max_tokens,
        "system": request.system,
        "messages": request.messages,
    });
    if !tools.is_empty() {
        body["tools"] = serde_json::Value::Array(tools);
    }
    body
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    content: Vec<serde_json::Value>,
    stop_reason: Option<String>,
    #[serde(default)]
    usage: ApiUsage,
}

#[derive(Deserialize, Default)]
struct ApiUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

/// Parse a Messages API response body.
///
/// Block types other than `text` and `tool_use` are skipped.
pub fn parse_response_body(body: serde_json::Value) -> Result<CompletionResponse, LlmError> {
    let api: ApiResponse =
        serde_json::from_value(body).map_err(|e| LlmError::Parse(e.to_string()))?;

    let mut content = Vec::with_capacity(api.content.len());
    for block in api.content {
        match block.get("type").and_then(|t| t.as_str()) {
            Some("text") | Some("tool_use") => {
                let parsed: ContentBlock = serde_json::from_value(block)
                    .map_err(|e| LlmError::Parse(format!("Malformed content block: {e}")))?;
                content.push(parsed);
            }
            other => debug!(block_type = ?other, "Skipping unsupported content block"),
        }
    }

    let stop_reason = match api.stop_reason.as_deref() {
        Some("end_turn") => StopReason::EndTurn,
        Some("tool_use") => StopReason::ToolUse,
        Some("max_tokens") => StopReason::MaxTokens,
        Some("stop_sequence") => StopReason::StopSequence,
        other => {
            return Err(LlmError::Parse(format!("Unexpected stop_reason: {other:?}")));
        }
    };

    Ok(CompletionResponse {
        content,
        stop_reason,
        usage: TokenUsage {
            input_tokens: api.usage.input_tokens,
            output_tokens: api.usage.output_tokens,
        },
    })
}

#[async_trait]
impl LlmDriver for AnthropicDriver {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = build_request_body(&request);
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending Anthropic request"
        );

        let resp = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Anthropic API returned an error");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;
        let response = parse_response_body(json)?;
        debug!(
            stop_reason = ?response.stop_reason,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Anthropic response received"
        );
        Ok(response)
    }
}
