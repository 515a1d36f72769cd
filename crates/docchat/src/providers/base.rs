use anyhow::Result;
use async_trait::async_trait;

use crate::messages::{ModelMessage, ModelResponse};
use crate::tool::Tool;

/// Base trait for model providers
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the next response for a conversation
    async fn complete(
        &self,
        instructions: Option<&str>,
        messages: &[ModelMessage],
        tools: &[Tool],
    ) -> Result<ModelResponse>;
}
