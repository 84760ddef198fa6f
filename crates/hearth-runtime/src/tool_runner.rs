//! Tool registry and dispatcher.
//!
//! The dispatcher owns the advertised tool descriptors and routes each call
//! to the provider registered for it. It never fails: unknown tools, bad
//! parameters, and provider errors all come back as `"Error: ..."` text so
//! the model sees them as ordinary tool output.

use async_trait::async_trait;
use hearth_types::error::ToolError;
use hearth_types::tool::{ParamType, ToolDefinition, ToolInput, ToolValue};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// An external integration that executes tools (calendar, mail, ...).
///
/// Input has already been validated against the tool's declared parameters.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Run `tool_name` and return a short human-readable summary.
    async fn execute(&self, tool_name: &str, input: &ToolInput) -> Result<String, ToolError>;
}

struct RegisteredTool {
    definition: ToolDefinition,
    provider: Arc<dyn ToolProvider>,
}

/// Routes tool calls to their providers.
#[derive(Default)]
pub struct ToolDispatcher {
    tools: Vec<RegisteredTool>,
    by_name: HashMap<String, usize>,
}

impl ToolDispatcher {
    /// An empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `definitions`, all served by `provider`.
    ///
    /// Re-registering a name replaces the earlier entry in place.
    pub fn register(&mut self, definitions: Vec<ToolDefinition>, provider: Arc<dyn ToolProvider>) {
        for definition in definitions {
            let entry = RegisteredTool {
                definition,
                provider: Arc::clone(&provider),
            };
            match self.by_name.get(&entry.definition.name) {
                Some(&idx) => {
                    warn!(tool = %entry.definition.name, "Tool registered twice, replacing");
                    self.tools[idx] = entry;
                }
                None => {
                    self.by_name
                        .insert(entry.definition.name.clone(), self.tools.len());
                    self.tools.push(entry);
                }
            }
        }
    }

    /// Descriptors of every registered tool, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition.clone()).collect()
    }

    /// Whether `name` is registered.
    pub fn has_tool(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute one tool call. Always returns result text.
    pub async fn execute(&self, name: &str, raw_input: &serde_json::Value) -> String {
        let Some(tool) = self.by_name.get(name).map(|&idx| &self.tools[idx]) else {
            warn!(tool = %name, "Unknown tool requested");
            return format!("Error: Unknown tool '{name}'");
        };

        let input = match validate_input(&tool.definition, raw_input) {
            Ok(input) => input,
            Err(reason) => {
                debug!(tool = %name, %reason, "Tool input rejected");
                return format!("Error: {reason}");
            }
        };

        match tool.provider.execute(name, &input).await {
            Ok(output) => {
                debug!(tool = %name, bytes = output.len(), "Tool succeeded");
                output
            }
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool failed");
                format!("Error: {e}")
            }
        }
    }
}

/// Check `raw` against the tool's declared parameters and coerce it into typed values.
///
/// Unknown extra keys are ignored. The error text is the part after `"Error: "`.
pub fn validate_input(
    definition: &ToolDefinition,
    raw: &serde_json::Value,
) -> Result<ToolInput, String> {
    let empty = serde_json::Map::new();
    let object = match raw {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => &empty,
        _ => return Err("Invalid input: expected an object of named parameters".to_string()),
    };

    let mut input = ToolInput::new();
    for param in &definition.params {
        let value = match object.get(&param.name) {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) if s.trim().is_empty() => None,
            Some(v) => Some(v),
        };
        let Some(value) = value else {
            if param.required {
                return Err(format!("Missing {} parameter", param.name));
            }
            continue;
        };
        let typed = coerce(&param.param_type, value)
            .map_err(|why| format!("Invalid {} parameter: {why}", param.name))?;
        input.insert(&param.name, typed);
    }
    Ok(input)
}

fn coerce(param_type: &ParamType, value: &serde_json::Value) -> Result<ToolValue, String> {
    use serde_json::Value;

    match param_type {
        ParamType::String => match value {
            Value::String(s) => Ok(ToolValue::String(s.clone())),
            Value::Number(n) => Ok(ToolValue::String(n.to_string())),
            Value::Bool(b) => Ok(ToolValue::String(b.to_string())),
            _ => Err("expected text".to_string()),
        },
        ParamType::Integer => match value {
            Value::Number(n) => n
                .as_i64()
                .map(ToolValue::Integer)
                .ok_or_else(|| format!("expected a whole number, got {n}")),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(ToolValue::Integer)
                .map_err(|_| format!("expected a whole number, got '{s}'")),
            _ => Err("expected a whole number".to_string()),
        },
        ParamType::Boolean => match value {
            Value::Bool(b) => Ok(ToolValue::Boolean(*b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(ToolValue::Boolean(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(ToolValue::Boolean(false)),
            _ => Err("expected true or false".to_string()),
        },
        ParamType::Enum(allowed) => {
            let Value::String(s) = value else {
                return Err(format!("expected one of: {}", allowed.join(", ")));
            };
            allowed
                .iter()
                .find(|a| a.eq_ignore_ascii_case(s.trim()))
                .map(|a| ToolValue::String(a.clone()))
                .ok_or_else(|| format!("'{s}' is not one of: {}", allowed.join(", ")))
        }
    }
}
