//! Conversion between agent messages and persisted turns
//!
//! Requests become user turns and responses become assistant turns. The conversion only covers
//! what the chatbot uses (plain text and tool use): writing a part kind we cannot persist fails
//! the whole call, while reading back content a side cannot rebuild silently drops it.
pub mod request;
pub mod response;

use uuid::Uuid;

use crate::errors::TranslationResult;
use crate::messages::{ModelMessage, ModelRequest, ModelResponse};
use crate::models::content::Content;
use crate::models::role::Role;
use crate::models::turn::Turn;

pub use request::RequestTranslator;
pub use response::ResponseTranslator;

/// Routes whole conversations through the request and response translators
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryTranslator {
    request: RequestTranslator,
    response: ResponseTranslator,
}

impl HistoryTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persisted turns to agent messages, one message per turn, in order
    pub fn turns_to_messages(&self, turns: &[Turn]) -> Vec<ModelMessage> {
        turns
            .iter()
            .map(|turn| match turn.role {
                Role::User => ModelMessage::Request(self.request.from_persisted_turn(turn)),
                Role::Assistant => ModelMessage::Response(self.response.from_persisted_turn(turn)),
            })
            .collect()
    }

    /// Agent messages to turns owned by `chat_id`, one turn per message, in order
    ///
    /// Any part that cannot be persisted fails the whole conversion.
    pub fn messages_to_turns(
        &self,
        chat_id: Uuid,
        messages: &[ModelMessage],
    ) -> TranslationResult<Vec<Turn>> {
        messages
            .iter()
            .map(|message| {
                let turn = match message {
                    ModelMessage::Request(request) => {
                        self.request.to_persisted_turn(chat_id, request)?
                    }
                    ModelMessage::Response(response) => {
                        self.response.to_persisted_turn(chat_id, response)?
                    }
                };
                turn.validate()?;
                Ok(turn)
            })
            .collect()
    }

    /// Human readable dump of a message, used for trace logging
    pub fn describe(&self, message: &ModelMessage) -> TranslationResult<String> {
        match message {
            ModelMessage::Request(request) => self.describe_request(request),
            ModelMessage::Response(response) => self.describe_response(response),
        }
    }

    fn describe_request(&self, request: &ModelRequest) -> TranslationResult<String> {
        let mut text = String::from("ModelRequest");
        text.push_str(&format!("\nRun: {}", display_opt(&request.run_id)));
        text.push_str(&format!(
            "\nInstructions: {}",
            display_opt(&request.instructions)
        ));
        text.push_str("\nParts:");
        for part in &request.parts {
            text.push('\n');
            text.push_str(&describe_content(&self.request.to_content(part)?));
        }
        Ok(text)
    }

    fn describe_response(&self, response: &ModelResponse) -> TranslationResult<String> {
        let mut text = String::from("ModelResponse");
        text.push_str(&format!("\nRun: {}", display_opt(&response.run_id)));
        text.push_str(&format!(
            "\nProvider: {}",
            display_opt(&response.provider_name)
        ));
        text.push_str(&format!("\nModel: {}", display_opt(&response.model_name)));
        text.push_str(&format!(
            "\nUsage: input_tokens={} output_tokens={}",
            response.usage.input_tokens, response.usage.output_tokens
        ));
        text.push_str(&format!(
            "\nFinish Reason: {}",
            display_opt(&response.finish_reason)
        ));
        text.push_str("\nParts:");
        for part in &response.parts {
            text.push('\n');
            text.push_str(&describe_content(&self.response.to_content(part)?));
        }
        Ok(text)
    }
}

fn display_opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("None")
}

fn describe_content(content: &[Content]) -> String {
    serde_json::to_string(content).unwrap_or_else(|_| format!("{:?}", content))
}
