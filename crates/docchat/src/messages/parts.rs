use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{TranslationError, TranslationResult};
use crate::models::content::ToolArgs;

/// Every part kind the agent framework knows about
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum PartKind {
    SystemPrompt,
    UserPrompt,
    ToolReturn,
    RetryPrompt,
    Text,
    ToolCall,
    Thinking,
    File,
    BuiltinToolCall,
    BuiltinToolReturn,
}

impl PartKind {
    pub fn is_request_kind(self) -> bool {
        matches!(
            self,
            PartKind::SystemPrompt
                | PartKind::UserPrompt
                | PartKind::ToolReturn
                | PartKind::RetryPrompt
        )
    }
}

/// Media embedded in a user prompt or produced as a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryContent {
    /// Base64 encoded payload
    pub data: String,
    pub media_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MediaContent {
    ImageUrl { url: String },
    Binary(BinaryContent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserContentItem {
    Text(String),
    Media(MediaContent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserContent {
    Text(String),
    Items(Vec<UserContentItem>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemPromptPart {
    pub content: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPromptPart {
    pub content: UserContent,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl UserPromptPart {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            content: UserContent::Text(text.into()),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolReturnPart {
    pub tool_name: String,
    pub content: Value,
    pub tool_call_id: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ToolReturnPart {
    pub fn new<N, I>(tool_name: N, content: Value, tool_call_id: I) -> Self
    where
        N: Into<String>,
        I: Into<String>,
    {
        Self {
            tool_name: tool_name.into(),
            content,
            tool_call_id: tool_call_id.into(),
            timestamp: Utc::now(),
        }
    }

    /// The return value as the model sees it: strings verbatim, anything else as JSON
    pub fn model_response_str(&self) -> String {
        match &self.content {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPromptPart {
    pub content: Value,
    #[serde(default)]
    pub tool_name: Option<String>,
    pub tool_call_id: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "part_kind", rename_all = "kebab-case")]
/// A piece of a request sent to the model
pub enum RequestPart {
    SystemPrompt(SystemPromptPart),
    UserPrompt(UserPromptPart),
    ToolReturn(ToolReturnPart),
    RetryPrompt(RetryPromptPart),
}

impl RequestPart {
    pub fn part_kind(&self) -> PartKind {
        match self {
            RequestPart::SystemPrompt(_) => PartKind::SystemPrompt,
            RequestPart::UserPrompt(_) => PartKind::UserPrompt,
            RequestPart::ToolReturn(_) => PartKind::ToolReturn,
            RequestPart::RetryPrompt(_) => PartKind::RetryPrompt,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            RequestPart::SystemPrompt(part) => part.timestamp,
            RequestPart::UserPrompt(part) => part.timestamp,
            RequestPart::ToolReturn(part) => part.timestamp,
            RequestPart::RetryPrompt(part) => part.timestamp,
        }
    }

    /// Decode a part from its JSON form, rejecting kinds outside the request schema
    pub fn from_value(value: Value) -> TranslationResult<Self> {
        let kind = part_kind_of(&value)?;
        match kind.parse::<PartKind>() {
            Ok(kind) if kind.is_request_kind() => Ok(serde_json::from_value(value)?),
            _ => Err(TranslationError::UnknownPartKind(kind.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPart {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallPart {
    pub tool_name: String,
    pub args: ToolArgs,
    pub tool_call_id: String,
}

impl ToolCallPart {
    pub fn new<N, A, I>(tool_name: N, args: A, tool_call_id: I) -> Self
    where
        N: Into<String>,
        A: Into<ToolArgs>,
        I: Into<String>,
    {
        Self {
            tool_name: tool_name.into(),
            args: args.into(),
            tool_call_id: tool_call_id.into(),
        }
    }

    pub fn args_as_map(&self) -> TranslationResult<Map<String, Value>> {
        self.args.as_map()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkingPart {
    pub content: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilePart {
    pub content: BinaryContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltinToolCallPart {
    pub tool_name: String,
    pub args: ToolArgs,
    pub tool_call_id: String,
    #[serde(default)]
    pub provider_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltinToolReturnPart {
    pub tool_name: String,
    pub content: Value,
    pub tool_call_id: String,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "part_kind", rename_all = "kebab-case")]
/// A piece of a response produced by the model
pub enum ResponsePart {
    Text(TextPart),
    ToolCall(ToolCallPart),
    Thinking(ThinkingPart),
    File(FilePart),
    BuiltinToolCall(BuiltinToolCallPart),
    BuiltinToolReturn(BuiltinToolReturnPart),
}

impl ResponsePart {
    pub fn text<S: Into<String>>(content: S) -> Self {
        ResponsePart::Text(TextPart {
            content: content.into(),
        })
    }

    pub fn part_kind(&self) -> PartKind {
        match self {
            ResponsePart::Text(_) => PartKind::Text,
            ResponsePart::ToolCall(_) => PartKind::ToolCall,
            ResponsePart::Thinking(_) => PartKind::Thinking,
            ResponsePart::File(_) => PartKind::File,
            ResponsePart::BuiltinToolCall(_) => PartKind::BuiltinToolCall,
            ResponsePart::BuiltinToolReturn(_) => PartKind::BuiltinToolReturn,
        }
    }

    /// Decode a part from its JSON form, rejecting kinds outside the response schema
    pub fn from_value(value: Value) -> TranslationResult<Self> {
        let kind = part_kind_of(&value)?;
        match kind.parse::<PartKind>() {
            Ok(kind) if !kind.is_request_kind() => Ok(serde_json::from_value(value)?),
            _ => Err(TranslationError::UnknownPartKind(kind.to_string())),
        }
    }
}

fn part_kind_of(value: &Value) -> TranslationResult<&str> {
    value
        .get("part_kind")
        .and_then(Value::as_str)
        .ok_or_else(|| TranslationError::Decode("part is missing its part_kind".to_string()))
}
