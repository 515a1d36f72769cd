use serde_json::Value;
use uuid::Uuid;

use crate::errors::{PartSide, TranslationError, TranslationResult};
use crate::messages::parts::{
    RequestPart, ToolReturnPart, UserContent, UserContentItem, UserPromptPart,
};
use crate::messages::ModelRequest;
use crate::models::content::Content;
use crate::models::turn::Turn;

/// Converts request messages (user prompts, tool returns) to and from user turns
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestTranslator;

impl RequestTranslator {
    pub fn to_content(&self, part: &RequestPart) -> TranslationResult<Vec<Content>> {
        match part {
            RequestPart::UserPrompt(prompt) => Ok(user_prompt_content(prompt)),
            RequestPart::ToolReturn(ret) => Ok(vec![Content::tool_response(
                &ret.tool_call_id,
                &ret.tool_name,
                ret.model_response_str(),
            )]),
            RequestPart::SystemPrompt(_) | RequestPart::RetryPrompt(_) => Err(
                TranslationError::unsupported(PartSide::Request, part.part_kind().to_string()),
            ),
        }
    }

    pub fn to_persisted_turn(&self, chat_id: Uuid, request: &ModelRequest) -> TranslationResult<Turn> {
        let mut content = Vec::new();
        for part in &request.parts {
            content.extend(self.to_content(part)?);
        }
        let created_at = request
            .parts
            .first()
            .map(RequestPart::timestamp)
            .ok_or(TranslationError::EmptyTurn)?;

        let mut turn = Turn::user(chat_id)
            .with_created_at(created_at)
            .with_system(request.instructions.clone());
        turn.content = content;
        Ok(turn)
    }

    /// Rebuild the request a user turn came from
    ///
    /// Only text and tool responses can be reconstructed, other content is skipped.
    pub fn from_persisted_turn(&self, turn: &Turn) -> ModelRequest {
        let parts = turn
            .content
            .iter()
            .filter_map(|content| match content {
                Content::Text(text) => Some(RequestPart::UserPrompt(UserPromptPart {
                    content: UserContent::Text(text.text.clone()),
                    timestamp: turn.created_at,
                })),
                Content::ToolResponse(response) => Some(RequestPart::ToolReturn(ToolReturnPart {
                    tool_name: response.tool_name.clone(),
                    content: Value::String(response.content.clone()),
                    tool_call_id: response.tool_call_id.clone(),
                    timestamp: turn.created_at,
                })),
                Content::ToolCall(_) => None,
            })
            .collect();

        ModelRequest::new(parts).with_instructions(turn.system.clone())
    }
}

fn user_prompt_content(prompt: &UserPromptPart) -> Vec<Content> {
    match &prompt.content {
        UserContent::Text(text) => vec![Content::text(text)],
        // media items have no persisted form yet and are dropped
        UserContent::Items(items) => items
            .iter()
            .filter_map(|item| match item {
                UserContentItem::Text(text) => Some(Content::text(text)),
                UserContentItem::Media(_) => None,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::parts::{MediaContent, RetryPromptPart, SystemPromptPart};
    use crate::models::role::Role;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn at(secs: i64) -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn prompt(text: &str, secs: i64) -> RequestPart {
        RequestPart::UserPrompt(UserPromptPart {
            content: UserContent::Text(text.to_string()),
            timestamp: at(secs),
        })
    }

    #[test]
    fn test_text_round_trip() {
        let chat_id = Uuid::new_v4();
        let request = ModelRequest::user_prompt("What is in the report?");

        let turn = RequestTranslator.to_persisted_turn(chat_id, &request).unwrap();
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.chat_id, chat_id);

        let rebuilt = RequestTranslator.from_persisted_turn(&turn);
        assert_eq!(rebuilt.parts.len(), 1);
        match &rebuilt.parts[0] {
            RequestPart::UserPrompt(part) => {
                assert_eq!(part.content, UserContent::Text("What is in the report?".into()))
            }
            other => panic!("Expected a user prompt, got {:?}", other),
        }
    }

    #[test]
    fn test_order_is_preserved() {
        let request = ModelRequest::new(vec![
            prompt("a", 10),
            RequestPart::ToolReturn(ToolReturnPart {
                tool_name: "roulette_wheel".into(),
                content: json!("loser"),
                tool_call_id: "c1".into(),
                timestamp: at(11),
            }),
            prompt("b", 12),
        ]);

        let turn = RequestTranslator
            .to_persisted_turn(Uuid::new_v4(), &request)
            .unwrap();
        assert_eq!(
            turn.content,
            vec![
                Content::text("a"),
                Content::tool_response("c1", "roulette_wheel", "loser"),
                Content::text("b"),
            ]
        );
        assert_eq!(turn.created_at, at(10));
    }

    #[test]
    fn test_instructions_become_system() {
        let request = ModelRequest::user_prompt("hi").with_instructions(Some("Be brief.".into()));
        let turn = RequestTranslator
            .to_persisted_turn(Uuid::new_v4(), &request)
            .unwrap();
        assert_eq!(turn.system.as_deref(), Some("Be brief."));
        assert!(turn.usage.is_none());
        assert!(turn.model.is_none());

        let rebuilt = RequestTranslator.from_persisted_turn(&turn);
        assert_eq!(rebuilt.instructions.as_deref(), Some("Be brief."));
    }

    #[test]
    fn test_non_text_user_items_are_dropped() {
        let part = RequestPart::UserPrompt(UserPromptPart {
            content: UserContent::Items(vec![
                UserContentItem::Text("look at this".into()),
                UserContentItem::Media(MediaContent::ImageUrl {
                    url: "https://example.com/scan.png".into(),
                }),
                UserContentItem::Text("and this".into()),
            ]),
            timestamp: at(0),
        });
        assert_eq!(
            RequestTranslator.to_content(&part).unwrap(),
            vec![Content::text("look at this"), Content::text("and this")]
        );
    }

    #[test]
    fn test_structured_tool_return_is_stringified() {
        let part = RequestPart::ToolReturn(ToolReturnPart::new("lookup", json!({"page": 3}), "c9"));
        assert_eq!(
            RequestTranslator.to_content(&part).unwrap(),
            vec![Content::tool_response("c9", "lookup", r#"{"page":3}"#)]
        );
    }

    #[test]
    fn test_system_prompt_is_unsupported() {
        let request = ModelRequest::new(vec![RequestPart::SystemPrompt(SystemPromptPart {
            content: "You are a chatbot.".into(),
            timestamp: at(0),
        })]);
        let err = RequestTranslator
            .to_persisted_turn(Uuid::new_v4(), &request)
            .unwrap_err();
        assert_eq!(
            err,
            TranslationError::UnsupportedPart {
                side: PartSide::Request,
                kind: "system-prompt".into()
            }
        );
    }

    #[test]
    fn test_retry_prompt_is_unsupported() {
        let request = ModelRequest::new(vec![
            prompt("a", 0),
            RequestPart::RetryPrompt(RetryPromptPart {
                content: json!("try again"),
                tool_name: Some("roulette_wheel".into()),
                tool_call_id: "c1".into(),
                timestamp: at(1),
            }),
        ]);
        let err = RequestTranslator
            .to_persisted_turn(Uuid::new_v4(), &request)
            .unwrap_err();
        assert!(matches!(err, TranslationError::UnsupportedPart { .. }));
        assert_eq!(err.to_string(), "ModelRequest retry-prompt part not supported yet");
    }

    #[test]
    fn test_empty_request_has_no_timestamp() {
        let err = RequestTranslator
            .to_persisted_turn(Uuid::new_v4(), &ModelRequest::new(Vec::new()))
            .unwrap_err();
        assert_eq!(err, TranslationError::EmptyTurn);
    }

    #[test]
    fn test_tool_calls_are_skipped_silently() {
        let turn = Turn::assistant(Uuid::new_v4()).with_content(Content::tool_call(
            "c1",
            "lookup",
            "{}",
        ));
        assert!(RequestTranslator.from_persisted_turn(&turn).parts.is_empty());
    }
}
