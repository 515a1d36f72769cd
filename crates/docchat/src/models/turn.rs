use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::{Content, ToolCallContent, ToolResponseContent};
use super::role::Role;
use crate::errors::{TranslationError, TranslationResult};

/// Token accounting reported for an assistant turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A persisted turn of a chat
pub struct Turn {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub role: Role,
    pub content: Vec<Content>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Turn {
    /// Create a new user turn with a fresh id and the current timestamp
    pub fn user(chat_id: Uuid) -> Self {
        Self::new(chat_id, Role::User)
    }

    /// Create a new assistant turn with a fresh id and the current timestamp
    pub fn assistant(chat_id: Uuid) -> Self {
        Self::new(chat_id, Role::Assistant)
    }

    fn new(chat_id: Uuid, role: Role) -> Self {
        Turn {
            id: Uuid::new_v4(),
            chat_id,
            role,
            content: Vec::new(),
            created_at: Utc::now(),
            system: None,
            usage: None,
            model: None,
        }
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.content.push(content);
        self
    }

    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_content(Content::text(text))
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_system(mut self, system: Option<String>) -> Self {
        self.system = system;
        self
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    /// Check that only user turns carry a system prompt and only assistant turns carry
    /// usage or model metadata.
    pub fn validate(&self) -> TranslationResult<()> {
        match self.role {
            Role::User if self.usage.is_some() || self.model.is_some() => {
                Err(TranslationError::InvalidTurn(format!(
                    "user turn {} carries usage or model metadata",
                    self.id
                )))
            }
            Role::Assistant if self.system.is_some() => Err(TranslationError::InvalidTurn(
                format!("assistant turn {} carries a system prompt", self.id),
            )),
            _ => Ok(()),
        }
    }

    /// All text content joined by newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(Content::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn has_tool_call(&self) -> bool {
        self.content.iter().any(|c| c.as_tool_call().is_some())
    }

    pub fn tool_calls(&self) -> Vec<&ToolCallContent> {
        self.content.iter().filter_map(Content::as_tool_call).collect()
    }

    pub fn has_tool_response(&self) -> bool {
        self.content.iter().any(|c| c.as_tool_response().is_some())
    }

    pub fn tool_responses(&self) -> Vec<&ToolResponseContent> {
        self.content
            .iter()
            .filter_map(Content::as_tool_response)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_turn_helpers() {
        let turn = Turn::assistant(Uuid::new_v4())
            .with_text("first")
            .with_content(Content::tool_call("c1", "lookup", "{}"))
            .with_text("second");

        assert_eq!(turn.text(), "first\nsecond");
        assert!(turn.has_tool_call());
        assert_eq!(turn.tool_calls()[0].tool_name, "lookup");
        assert!(!turn.has_tool_response());
        assert!(turn.tool_responses().is_empty());
    }

    #[test]
    fn test_validate_role_metadata() {
        let chat_id = Uuid::new_v4();
        assert!(Turn::user(chat_id)
            .with_system(Some("be nice".into()))
            .validate()
            .is_ok());
        assert!(Turn::assistant(chat_id)
            .with_usage(Usage::new(1, 2))
            .with_model(Some("m1".into()))
            .validate()
            .is_ok());

        let err = Turn::user(chat_id)
            .with_usage(Usage::new(1, 2))
            .validate()
            .unwrap_err();
        assert!(matches!(err, TranslationError::InvalidTurn(_)));

        let err = Turn::assistant(chat_id)
            .with_system(Some("nope".into()))
            .validate()
            .unwrap_err();
        assert!(matches!(err, TranslationError::InvalidTurn(_)));
    }

    #[test]
    fn test_optional_fields_skipped_when_absent() {
        let turn = Turn::user(Uuid::new_v4()).with_text("hi");
        let value = serde_json::to_value(&turn).unwrap();
        assert_eq!(value["role"], json!("user"));
        assert!(value.get("system").is_none());
        assert!(value.get("usage").is_none());
        assert!(value.get("model").is_none());
    }
}
