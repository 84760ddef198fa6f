//! Tool definition, typed parameter, and result types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declared type of a tool parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum ParamType {
    /// Free text.
    String,
    /// A whole number.
    Integer,
    /// true / false.
    Boolean,
    /// One of a fixed set of strings.
    Enum(Vec<String>),
}

impl ParamType {
    /// JSON Schema type name.
    pub fn schema_type(&self) -> &'static str {
        match self {
            ParamType::String | ParamType::Enum(_) => "string",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
        }
    }
}

/// One declared parameter of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParam {
    /// Parameter name as the model sends it.
    pub name: String,
    /// Declared type.
    pub param_type: ParamType,
    /// Human-readable description for the LLM.
    pub description: String,
    /// Whether the call is rejected when this parameter is absent.
    pub required: bool,
}

impl ToolParam {
    /// A required parameter.
    pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
            required: true,
        }
    }

    /// An optional parameter.
    pub fn optional(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }
}

/// Definition of a tool the assistant can use. Read-only after start-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool identifier.
    pub name: String,
    /// Human-readable description for the LLM.
    pub description: String,
    /// Declared parameters.
    pub params: Vec<ToolParam>,
}

impl ToolDefinition {
    /// Create a definition with no parameters.
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            params: Vec::new(),
        }
    }

    /// Add a parameter (builder style).
    pub fn param(mut self, param: ToolParam) -> Self {
        self.params.push(param);
        self
    }

    /// Names of the required parameters, in declaration order.
    pub fn required_params(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// The JSON Schema advertised to the backend:
    /// `{ type, required: [...], properties: { name: { type, description, enum? } } }`.
    pub fn input_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        for p in &self.params {
            let mut prop = serde_json::Map::new();
            prop.insert("type".into(), p.param_type.schema_type().into());
            prop.insert("description".into(), p.description.clone().into());
            if let ParamType::Enum(values) = &p.param_type {
                prop.insert("enum".into(), serde_json::json!(values));
            }
            properties.insert(p.name.clone(), serde_json::Value::Object(prop));
        }
        serde_json::json!({
            "type": "object",
            "required": self.required_params(),
            "properties": properties,
        })
    }
}

/// A validated parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolValue {
    /// Text (also carries validated enum values).
    String(String),
    /// A whole number.
    Integer(i64),
    /// A flag.
    Boolean(bool),
}

/// Validated parameters handed to a tool collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInput(BTreeMap<String, ToolValue>);

impl ToolInput {
    /// An empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value (builder style).
    pub fn with(mut self, name: &str, value: ToolValue) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a value.
    pub fn insert(&mut self, name: &str, value: ToolValue) {
        self.0.insert(name.to_string(), value);
    }

    /// Raw access to a value.
    pub fn get(&self, name: &str) -> Option<&ToolValue> {
        self.0.get(name)
    }

    /// A string (or enum) parameter.
    pub fn str(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(ToolValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// An integer parameter.
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.0.get(name) {
            Some(ToolValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    /// A boolean parameter.
    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.0.get(name) {
            Some(ToolValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    /// Number of parameters present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no parameters are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A tool call requested by the LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique ID for this tool use instance.
    pub id: String,
    /// Which tool to call.
    pub name: String,
    /// The raw input parameters.
    pub input: serde_json::Value,
}

/// Result of a tool execution, keyed to the call it answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The tool_use ID this result corresponds to.
    pub tool_use_id: String,
    /// The output content.
    pub content: String,
    /// Whether the tool execution resulted in an error.
    pub is_error: bool,
}

impl ToolResult {
    /// Build a result from dispatcher output; `"Error: "` prefixed text is flagged.
    pub fn from_output(tool_use_id: &str, content: String) -> Self {
        Self {
            tool_use_id: tool_use_id.to_string(),
            is_error: content.starts_with("Error:"),
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_schema_shape() {
        let tool = ToolDefinition::new("reminders_create", "Create a reminder")
            .param(ToolParam::required("title", ParamType::String, "Reminder text"))
            .param(ToolParam::optional(
                "priority",
                ParamType::Enum(vec!["low".into(), "high".into()]),
                "Priority",
            ));
        let schema = tool.input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], serde_json::json!(["title"]));
        assert_eq!(schema["properties"]["title"]["type"], "string");
        assert_eq!(
            schema["properties"]["priority"]["enum"],
            serde_json::json!(["low", "high"])
        );
        assert!(schema["properties"]["title"].get("enum").is_none());
    }

    #[test]
    fn test_tool_input_accessors() {
        let input = ToolInput::new()
            .with("query", ToolValue::String("dentist".into()))
            .with("limit", ToolValue::Integer(5))
            .with("all_day", ToolValue::Boolean(true));
        assert_eq!(input.str("query"), Some("dentist"));
        assert_eq!(input.int("limit"), Some(5));
        assert_eq!(input.bool("all_day"), Some(true));
        assert_eq!(input.str("limit"), None);
        assert_eq!(input.len(), 3);
    }

    #[test]
    fn test_tool_result_flags_errors() {
        assert!(ToolResult::from_output("t1", "Error: nope".into()).is_error);
        assert!(!ToolResult::from_output("t1", "3 events".into()).is_error);
    }
}
