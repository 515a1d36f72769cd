use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::sync::Mutex;

use crate::messages::parts::ResponsePart;
use crate::messages::{ModelMessage, ModelResponse};
use crate::providers::base::Provider;
use crate::tool::Tool;

/// A mock provider that returns pre-configured responses for testing
#[derive(Clone, Default)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<ModelResponse>>>,
    seen: Arc<Mutex<Vec<Vec<ModelMessage>>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The conversations this provider was asked to complete, oldest first
    pub fn seen(&self) -> Vec<Vec<ModelMessage>> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _instructions: Option<&str>,
        messages: &[ModelMessage],
        _tools: &[Tool],
    ) -> Result<ModelResponse> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(messages.to_vec());
        }
        let mut responses = self
            .responses
            .lock()
            .map_err(|_| anyhow::anyhow!("mock provider lock poisoned"))?;
        if responses.is_empty() {
            // Return empty response if no more pre-configured responses
            Ok(ModelResponse::new(vec![ResponsePart::text("")]))
        } else {
            // stamp on delivery like a live provider would
            let mut response = responses.remove(0);
            response.timestamp = Utc::now();
            Ok(response)
        }
    }
}
