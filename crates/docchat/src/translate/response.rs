use uuid::Uuid;

use crate::errors::{PartSide, TranslationError, TranslationResult};
use crate::messages::parts::{ResponsePart, TextPart, ToolCallPart};
use crate::messages::ModelResponse;
use crate::models::content::{Content, ToolArgs};
use crate::models::turn::Turn;

/// Converts model responses (text, tool calls) to and from assistant turns
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseTranslator;

impl ResponseTranslator {
    pub fn to_content(&self, part: &ResponsePart) -> TranslationResult<Vec<Content>> {
        match part {
            ResponsePart::Text(text) => Ok(vec![Content::text(&text.content)]),
            ResponsePart::ToolCall(call) => Ok(vec![Content::tool_call(
                &call.tool_call_id,
                &call.tool_name,
                ToolArgs::Object(call.args_as_map()?),
            )]),
            ResponsePart::Thinking(_)
            | ResponsePart::File(_)
            | ResponsePart::BuiltinToolCall(_)
            | ResponsePart::BuiltinToolReturn(_) => Err(TranslationError::unsupported(
                PartSide::Response,
                part.part_kind().to_string(),
            )),
        }
    }

    pub fn to_persisted_turn(
        &self,
        chat_id: Uuid,
        response: &ModelResponse,
    ) -> TranslationResult<Turn> {
        let mut content = Vec::new();
        for part in &response.parts {
            content.extend(self.to_content(part)?);
        }

        let mut turn = Turn::assistant(chat_id)
            .with_created_at(response.timestamp)
            .with_usage(response.usage)
            .with_model(response.model_name.clone());
        turn.content = content;
        Ok(turn)
    }

    /// Rebuild the response an assistant turn came from
    ///
    /// Only text and tool calls can be reconstructed, other content is skipped.
    pub fn from_persisted_turn(&self, turn: &Turn) -> ModelResponse {
        let parts = turn
            .content
            .iter()
            .filter_map(|content| match content {
                Content::Text(text) => Some(ResponsePart::Text(TextPart {
                    content: text.text.clone(),
                })),
                Content::ToolCall(call) => Some(ResponsePart::ToolCall(ToolCallPart {
                    tool_name: call.tool_name.clone(),
                    args: call.args.clone(),
                    tool_call_id: call.tool_call_id.clone(),
                })),
                Content::ToolResponse(_) => None,
            })
            .collect();

        ModelResponse::new(parts)
            .with_timestamp(turn.created_at)
            .with_usage(turn.usage.unwrap_or_default())
            .with_model_name(turn.model.clone())
    }
}
