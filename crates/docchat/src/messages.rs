//! Agent messages: the conversation format exchanged with the model provider
//!
//! A conversation is a list of [`ModelMessage`]s alternating between requests (what we send to
//! the model: user prompts, tool returns, ...) and responses (what the model produced: text,
//! tool calls, ...). Each message is made of parts, see [`parts`].
pub mod parts;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{TranslationError, TranslationResult};
use crate::models::turn::Usage;
use parts::{RequestPart, ResponsePart, ToolCallPart, UserPromptPart};

pub use parts::PartKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    pub parts: Vec<RequestPart>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub run_id: Option<String>,
}

impl ModelRequest {
    pub fn new(parts: Vec<RequestPart>) -> Self {
        Self {
            parts,
            instructions: None,
            run_id: None,
        }
    }

    /// A request carrying a single user prompt
    pub fn user_prompt<S: Into<String>>(text: S) -> Self {
        Self::new(vec![RequestPart::UserPrompt(UserPromptPart::new(text))])
    }

    pub fn with_instructions(mut self, instructions: Option<String>) -> Self {
        self.instructions = instructions;
        self
    }

    pub fn with_run_id(mut self, run_id: Option<String>) -> Self {
        self.run_id = run_id;
        self
    }
}

/// Token accounting for a single model request
pub type RequestUsage = Usage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub parts: Vec<ResponsePart>,
    #[serde(default)]
    pub usage: RequestUsage,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub run_id: Option<String>,
}

impl ModelResponse {
    pub fn new(parts: Vec<ResponsePart>) -> Self {
        Self {
            parts,
            usage: RequestUsage::default(),
            model_name: None,
            provider_name: None,
            finish_reason: None,
            timestamp: Utc::now(),
            run_id: None,
        }
    }

    pub fn with_usage(mut self, usage: RequestUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_model_name(mut self, model_name: Option<String>) -> Self {
        self.model_name = model_name;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCallPart> {
        self.parts.iter().filter_map(|part| match part {
            ResponsePart::ToolCall(call) => Some(call),
            _ => None,
        })
    }

    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls().next().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
/// A message to or from the model
pub enum ModelMessage {
    Request(ModelRequest),
    Response(ModelResponse),
}

impl ModelMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelMessage::Request(_) => "request",
            ModelMessage::Response(_) => "response",
        }
    }

    pub fn as_request(&self) -> Option<&ModelRequest> {
        match self {
            ModelMessage::Request(request) => Some(request),
            _ => None,
        }
    }

    pub fn as_response(&self) -> Option<&ModelResponse> {
        match self {
            ModelMessage::Response(response) => Some(response),
            _ => None,
        }
    }

    /// Decode a message from its JSON form
    ///
    /// Parts are checked against the schema of their side before decoding so that a kind the
    /// framework does not know surfaces as [`TranslationError::UnknownPartKind`].
    pub fn from_value(mut value: Value) -> TranslationResult<Self> {
        let parts = match value.get_mut("parts").map(Value::take) {
            Some(Value::Array(parts)) => parts,
            _ => return Err(TranslationError::Decode("message has no parts array".into())),
        };
        let kind = value.get("kind").and_then(Value::as_str).unwrap_or_default();
        match kind {
            "request" => {
                let parts = parts
                    .into_iter()
                    .map(RequestPart::from_value)
                    .collect::<TranslationResult<Vec<_>>>()?;
                let mut request: ModelRequest =
                    serde_json::from_value(with_parts(value, Vec::new()))?;
                request.parts = parts;
                Ok(ModelMessage::Request(request))
            }
            "response" => {
                let parts = parts
                    .into_iter()
                    .map(ResponsePart::from_value)
                    .collect::<TranslationResult<Vec<_>>>()?;
                let mut response: ModelResponse =
                    serde_json::from_value(with_parts(value, Vec::new()))?;
                response.parts = parts;
                Ok(ModelMessage::Response(response))
            }
            other => Err(TranslationError::Decode(format!(
                "unknown message kind '{}'",
                other
            ))),
        }
    }

    /// Decode a JSON array of messages
    pub fn list_from_json(raw: &str) -> TranslationResult<Vec<Self>> {
        match serde_json::from_str::<Value>(raw)? {
            Value::Array(items) => items.into_iter().map(Self::from_value).collect(),
            _ => Err(TranslationError::Decode("expected a JSON array of messages".into())),
        }
    }
}

fn with_parts(mut value: Value, parts: Vec<Value>) -> Value {
    value["parts"] = Value::Array(parts);
    value
}

impl From<ModelRequest> for ModelMessage {
    fn from(request: ModelRequest) -> Self {
        ModelMessage::Request(request)
    }
}

impl From<ModelResponse> for ModelMessage {
    fn from(response: ModelResponse) -> Self {
        ModelMessage::Response(response)
    }
}
