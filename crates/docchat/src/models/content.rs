use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{TranslationError, TranslationResult};

/// Tool call arguments, either raw JSON text or an already parsed object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolArgs {
    Text(String),
    Object(Map<String, Value>),
}

impl ToolArgs {
    /// Interpret the arguments as a JSON object
    ///
    /// Empty text counts as no arguments. Text that does not parse to an object is rejected.
    pub fn as_map(&self) -> TranslationResult<Map<String, Value>> {
        match self {
            ToolArgs::Object(map) => Ok(map.clone()),
            ToolArgs::Text(text) if text.trim().is_empty() => Ok(Map::new()),
            ToolArgs::Text(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(map)) => Ok(map),
                Ok(other) => Err(TranslationError::InvalidToolArgs(other.to_string())),
                Err(e) => Err(TranslationError::InvalidToolArgs(e.to_string())),
            },
        }
    }
}

impl From<Map<String, Value>> for ToolArgs {
    fn from(map: Map<String, Value>) -> Self {
        ToolArgs::Object(map)
    }
}

impl From<String> for ToolArgs {
    fn from(text: String) -> Self {
        ToolArgs::Text(text)
    }
}

impl From<&str> for ToolArgs {
    fn from(text: &str) -> Self {
        ToolArgs::Text(text.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallContent {
    pub tool_call_id: String,
    pub tool_name: String,
    pub args: ToolArgs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponseContent {
    pub tool_call_id: String,
    pub tool_name: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// One piece of a persisted turn
pub enum Content {
    Text(TextContent),
    ToolCall(ToolCallContent),
    ToolResponse(ToolResponseContent),
}

impl Content {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Content::Text(TextContent { text: text.into() })
    }

    pub fn tool_call<I, N, A>(tool_call_id: I, tool_name: N, args: A) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        A: Into<ToolArgs>,
    {
        Content::ToolCall(ToolCallContent {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            args: args.into(),
        })
    }

    pub fn tool_response<I, N, C>(tool_call_id: I, tool_name: N, content: C) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        C: Into<String>,
    {
        Content::ToolResponse(ToolResponseContent {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            content: content.into(),
        })
    }

    /// The persisted `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            Content::Text(_) => "text",
            Content::ToolCall(_) => "tool_call",
            Content::ToolResponse(_) => "tool_response",
        }
    }

    /// Get the text content if this is a TextContent variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(&text.text),
            _ => None,
        }
    }

    pub fn as_tool_call(&self) -> Option<&ToolCallContent> {
        match self {
            Content::ToolCall(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_tool_response(&self) -> Option<&ToolResponseContent> {
        match self {
            Content::ToolResponse(response) => Some(response),
            _ => None,
        }
    }

    /// Decode a single persisted content object
    pub fn from_value(value: Value) -> TranslationResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Decode the persisted content array of a turn
    pub fn decode_list(raw: &str) -> TranslationResult<Vec<Self>> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Encode a content list into its persisted array form
    pub fn encode_list(content: &[Content]) -> TranslationResult<String> {
        serde_json::to_string(content).map_err(|e| TranslationError::Decode(e.to_string()))
    }
}
