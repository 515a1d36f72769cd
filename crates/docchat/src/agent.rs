use serde_json::Value;

use crate::errors::{AgentError, AgentResult};
use crate::messages::parts::{RequestPart, ToolReturnPart, UserPromptPart};
use crate::messages::{ModelMessage, ModelRequest};
use crate::providers::base::Provider;
use crate::tool::{self, ChatbotDeps, Tool};
use crate::translate::HistoryTranslator;

pub const CHATBOT_INSTRUCTIONS: &str = "You are a chatbot. Converse with the user friendly.";
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;

/// Agent pairs a model provider with the chatbot's instructions and tools
pub struct Agent {
    provider: Box<dyn Provider>,
    instructions: String,
    tools: Vec<Tool>,
    max_tool_rounds: usize,
}

impl Agent {
    /// Create a new chatbot agent with the specified provider
    pub fn new(provider: Box<dyn Provider>) -> Self {
        Self {
            provider,
            instructions: CHATBOT_INSTRUCTIONS.to_string(),
            tools: vec![tool::roulette_wheel_tool()],
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_max_tool_rounds(mut self, max_tool_rounds: usize) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self
    }

    /// Answer `user_input` given the prior conversation
    ///
    /// Keeps calling the provider while it asks for tools and returns only the messages
    /// produced by this run: the user request, every model response and every tool return.
    pub async fn run(
        &self,
        user_input: &str,
        deps: &ChatbotDeps,
        history: &[ModelMessage],
    ) -> AgentResult<Vec<ModelMessage>> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let mut new_messages = vec![ModelMessage::Request(self.request(
            vec![RequestPart::UserPrompt(UserPromptPart::new(user_input))],
            &run_id,
        ))];

        for round in 0..=self.max_tool_rounds {
            let conversation: Vec<ModelMessage> =
                history.iter().chain(new_messages.iter()).cloned().collect();

            let mut response = self
                .provider
                .complete(Some(&self.instructions), &conversation, &self.tools)
                .await
                .map_err(AgentError::Provider)?;
            response.run_id = Some(run_id.clone());

            let returns: Vec<RequestPart> = response
                .tool_calls()
                .map(|call| {
                    let content = match tool::dispatch(call, deps) {
                        Ok(output) => output,
                        Err(e) => {
                            tracing::warn!(tool = %call.tool_name, error = %e, "tool call failed");
                            Value::String(format!("Error: {}", e))
                        }
                    };
                    RequestPart::ToolReturn(ToolReturnPart::new(
                        &call.tool_name,
                        content,
                        &call.tool_call_id,
                    ))
                })
                .collect();

            tracing::debug!(round, tool_calls = returns.len(), "model responded");
            let response = ModelMessage::Response(response);
            self.trace(&response);
            new_messages.push(response);

            if returns.is_empty() {
                return Ok(new_messages);
            }
            if round == self.max_tool_rounds {
                break;
            }
            let tool_request = ModelMessage::Request(self.request(returns, &run_id));
            self.trace(&tool_request);
            new_messages.push(tool_request);
        }

        Err(AgentError::TooManyToolRounds(self.max_tool_rounds))
    }

    fn request(&self, parts: Vec<RequestPart>, run_id: &str) -> ModelRequest {
        ModelRequest::new(parts)
            .with_instructions(Some(self.instructions.clone()))
            .with_run_id(Some(run_id.to_string()))
    }

    fn trace(&self, message: &ModelMessage) {
        if tracing::enabled!(tracing::Level::TRACE) {
            match HistoryTranslator::new().describe(message) {
                Ok(text) => tracing::trace!("{}", text),
                Err(e) => tracing::trace!(error = %e, "message cannot be described"),
            }
        }
    }
}
