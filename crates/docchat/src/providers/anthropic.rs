use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Map, Value};
use std::time::Duration;

use super::base::Provider;
use super::configs::AnthropicProviderConfig;
use crate::messages::parts::{
    MediaContent, RequestPart, ResponsePart, ThinkingPart, ToolCallPart, UserContent,
    UserContentItem,
};
use crate::messages::{ModelMessage, ModelResponse, RequestUsage};
use crate::models::content::ToolArgs;
use crate::tool::Tool;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: i32 = 1 << 12;

pub struct AnthropicProvider {
    client: Client,
    config: AnthropicProviderConfig,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    fn get_usage(data: &Value) -> RequestUsage {
        let usage = &data["usage"];
        RequestUsage::new(
            usage["input_tokens"].as_u64().unwrap_or_default(),
            usage["output_tokens"].as_u64().unwrap_or_default(),
        )
    }

    /// Convert agent messages into the Anthropic messages spec
    ///
    /// Returns the system prompt collected from system prompt parts (if any) together with the
    /// messages. Consecutive messages with the same role are merged since the API expects the
    /// roles to alternate.
    fn messages_to_anthropic_spec(messages: &[ModelMessage]) -> Result<(Vec<String>, Vec<Value>)> {
        let mut system = Vec::new();
        let mut anthropic_messages: Vec<Value> = Vec::new();

        for message in messages {
            let (role, blocks) = match message {
                ModelMessage::Request(request) => {
                    let mut blocks = Vec::new();
                    for part in &request.parts {
                        match part {
                            RequestPart::SystemPrompt(prompt) => system.push(prompt.content.clone()),
                            RequestPart::UserPrompt(prompt) => match &prompt.content {
                                UserContent::Text(text) => blocks.push(text_block(text)),
                                UserContent::Items(items) => {
                                    blocks.extend(items.iter().map(user_item_block))
                                }
                            },
                            RequestPart::ToolReturn(ret) => blocks.push(json!({
                                "type": "tool_result",
                                "tool_use_id": ret.tool_call_id,
                                "content": ret.model_response_str(),
                            })),
                            RequestPart::RetryPrompt(retry) => {
                                let text = match &retry.content {
                                    Value::String(text) => text.clone(),
                                    other => other.to_string(),
                                };
                                if retry.tool_name.is_some() {
                                    blocks.push(json!({
                                        "type": "tool_result",
                                        "tool_use_id": retry.tool_call_id,
                                        "content": text,
                                        "is_error": true,
                                    }));
                                } else {
                                    blocks.push(text_block(&text));
                                }
                            }
                        }
                    }
                    ("user", blocks)
                }
                ModelMessage::Response(response) => {
                    let mut blocks = Vec::new();
                    for part in &response.parts {
                        match part {
                            ResponsePart::Text(text) if !text.content.is_empty() => {
                                blocks.push(text_block(&text.content))
                            }
                            ResponsePart::ToolCall(call) => blocks.push(json!({
                                "type": "tool_use",
                                "id": call.tool_call_id,
                                "name": call.tool_name,
                                "input": call.args_as_map()?,
                            })),
                            ResponsePart::Thinking(ThinkingPart {
                                content,
                                signature: Some(signature),
                                ..
                            }) => blocks.push(json!({
                                "type": "thinking",
                                "thinking": content,
                                "signature": signature,
                            })),
                            _ => {} // Skip other parts, the API has no input form for them
                        }
                    }
                    ("assistant", blocks)
                }
            };

            if blocks.is_empty() {
                continue;
            }
            match anthropic_messages.last_mut() {
                Some(last) if last["role"] == role => {
                    if let Some(content) = last["content"].as_array_mut() {
                        content.extend(blocks);
                    }
                }
                _ => anthropic_messages.push(json!({
                    "role": role,
                    "content": blocks,
                })),
            }
        }

        Ok((system, anthropic_messages))
    }

    fn tools_to_anthropic_spec(tools: &[Tool]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "input_schema": tool.input_schema,
                })
            })
            .collect()
    }

    fn anthropic_response_to_message(response: &Value) -> Result<ModelResponse> {
        let blocks = response
            .get("content")
            .and_then(Value::as_array)
            .ok_or_else(|| anyhow!("Invalid response format from Anthropic API"))?;

        let mut parts = Vec::new();
        for block in blocks {
            match block["type"].as_str() {
                Some("text") => {
                    parts.push(ResponsePart::text(block["text"].as_str().unwrap_or_default()))
                }
                Some("tool_use") => {
                    let args = match &block["input"] {
                        Value::Object(map) => ToolArgs::Object(map.clone()),
                        Value::Null => ToolArgs::Object(Map::new()),
                        other => ToolArgs::Text(other.to_string()),
                    };
                    parts.push(ResponsePart::ToolCall(ToolCallPart::new(
                        block["name"].as_str().unwrap_or_default(),
                        args,
                        block["id"].as_str().unwrap_or_default(),
                    )));
                }
                Some("thinking") => parts.push(ResponsePart::Thinking(ThinkingPart {
                    content: block["thinking"].as_str().unwrap_or_default().to_string(),
                    id: None,
                    signature: block["signature"].as_str().map(String::from),
                })),
                other => tracing::debug!(block_type = ?other, "skipping anthropic content block"),
            }
        }

        let mut message = ModelResponse::new(parts)
            .with_usage(Self::get_usage(response))
            .with_model_name(response["model"].as_str().map(String::from));
        message.provider_name = Some("anthropic".to_string());
        message.finish_reason = response["stop_reason"].as_str().map(String::from);
        message.timestamp = Utc::now();
        Ok(message)
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!("{}/v1/messages", self.config.host.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(anyhow!("Server error: {}", status))
            }
            status => {
                let error_text = response.text().await?;
                Err(anyhow!("Request failed: {} - {}", status, error_text))
            }
        }
    }
}

fn text_block(text: &str) -> Value {
    json!({"type": "text", "text": text})
}

fn user_item_block(item: &UserContentItem) -> Value {
    match item {
        UserContentItem::Text(text) => text_block(text),
        UserContentItem::Media(MediaContent::ImageUrl { url }) => json!({
            "type": "image",
            "source": {"type": "url", "url": url},
        }),
        UserContentItem::Media(MediaContent::Binary(binary)) => {
            let kind = if binary.media_type == "application/pdf" {
                "document"
            } else {
                "image"
            };
            json!({
                "type": kind,
                "source": {
                    "type": "base64",
                    "media_type": binary.media_type,
                    "data": binary.data,
                }
            })
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn complete(
        &self,
        instructions: Option<&str>,
        messages: &[ModelMessage],
        tools: &[Tool],
    ) -> Result<ModelResponse> {
        let (mut system, anthropic_messages) = Self::messages_to_anthropic_spec(messages)?;
        if let Some(instructions) = instructions {
            system.push(instructions.to_string());
        }

        let mut payload = json!({
            "model": self.config.model,
            "messages": anthropic_messages,
            "max_tokens": self.config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        });
        if let Some(object) = payload.as_object_mut() {
            if !system.is_empty() {
                object.insert("system".to_string(), json!(system.join("\n\n")));
            }
            if !tools.is_empty() {
                object.insert("tools".to_string(), json!(Self::tools_to_anthropic_spec(tools)));
            }
            if let Some(temp) = self.config.temperature {
                object.insert("temperature".to_string(), json!(temp));
            }
        }

        tracing::debug!(
            model = %self.config.model,
            messages = anthropic_messages_len(&payload),
            "sending anthropic request"
        );
        let response = self.post(payload).await?;
        Self::anthropic_response_to_message(&response)
    }
}

fn anthropic_messages_len(payload: &Value) -> usize {
    payload["messages"].as_array().map(Vec::len).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::parts::{ToolReturnPart, UserPromptPart};
    use crate::messages::ModelRequest;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup_mock_server(response_body: Value) -> (MockServer, AnthropicProvider) {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test_api_key"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(response_body))
            .mount(&mock_server)
            .await;

        let config = AnthropicProviderConfig {
            host: mock_server.uri(),
            api_key: "test_api_key".to_string(),
            model: "claude-haiku-4-5-20251001".to_string(),
            temperature: Some(0.0),
            max_tokens: None,
        };

        let provider = AnthropicProvider::new(config).unwrap();
        (mock_server, provider)
    }

    #[tokio::test]
    async fn test_complete_basic() -> Result<()> {
        let response_body = json!({
            "id": "msg_123",
            "type": "message",
            "role": "assistant",
            "content": [{
                "type": "text",
                "text": "Hello! How can I assist you today?"
            }],
            "model": "claude-haiku-4-5-20251001",
            "stop_reason": "end_turn",
            "stop_sequence": null,
            "usage": {
                "input_tokens": 12,
                "output_tokens": 15
            }
        });

        let (_server, provider) = setup_mock_server(response_body).await;
        let messages = vec![ModelMessage::from(ModelRequest::user_prompt("Hello?"))];

        let response = provider
            .complete(Some("You are a chatbot."), &messages, &[])
            .await?;

        assert_eq!(
            response.parts,
            vec![ResponsePart::text("Hello! How can I assist you today?")]
        );
        assert_eq!(response.usage, RequestUsage::new(12, 15));
        assert_eq!(response.model_name.as_deref(), Some("claude-haiku-4-5-20251001"));
        assert_eq!(response.finish_reason.as_deref(), Some("end_turn"));
        Ok(())
    }

    #[tokio::test]
    async fn test_complete_tool_use() -> Result<()> {
        let response_body = json!({
            "content": [
                {"type": "text", "text": "Let me spin."},
                {"type": "tool_use", "id": "toolu_1", "name": "roulette_wheel", "input": {"square": 7}}
            ],
            "model": "claude-haiku-4-5-20251001",
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 40, "output_tokens": 20}
        });
        let (_server, provider) = setup_mock_server(response_body).await;

        let response = provider
            .complete(None, &[ModelRequest::user_prompt("spin 7").into()], &[])
            .await?;
        let calls: Vec<_> = response.tool_calls().collect();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool_call_id, "toolu_1");
        assert_eq!(calls[0].args_as_map()?["square"], json!(7));
        Ok(())
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad model"))
            .mount(&server)
            .await;
        let provider = AnthropicProvider::new(AnthropicProviderConfig {
            host: server.uri(),
            api_key: "k".into(),
            model: "nope".into(),
            temperature: None,
            max_tokens: None,
        })
        .unwrap();

        let err = provider
            .complete(None, &[ModelRequest::user_prompt("hi").into()], &[])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("bad model"));
    }

    #[test]
    fn test_messages_to_anthropic_spec() -> Result<()> {
        let messages = vec![
            ModelMessage::from(ModelRequest::new(vec![RequestPart::UserPrompt(
                UserPromptPart::new("spin 7"),
            )])),
            ModelResponse::new(vec![ResponsePart::ToolCall(ToolCallPart::new(
                "roulette_wheel",
                r#"{"square": 7}"#,
                "c1",
            ))])
            .into(),
            ModelRequest::new(vec![RequestPart::ToolReturn(ToolReturnPart::new(
                "roulette_wheel",
                json!("winner"),
                "c1",
            ))])
            .into(),
            ModelRequest::user_prompt("nice").into(),
        ];

        let (system, spec) = AnthropicProvider::messages_to_anthropic_spec(&messages)?;
        assert!(system.is_empty());
        assert_eq!(spec.len(), 3);
        assert_eq!(spec[1]["content"][0]["type"], "tool_use");
        assert_eq!(spec[1]["content"][0]["input"], json!({"square": 7}));
        // the tool result and the follow up prompt share one user message
        assert_eq!(spec[2]["role"], "user");
        assert_eq!(spec[2]["content"][0]["type"], "tool_result");
        assert_eq!(spec[2]["content"][0]["content"], "winner");
        assert_eq!(spec[2]["content"][1]["text"], "nice");
        Ok(())
    }
}
