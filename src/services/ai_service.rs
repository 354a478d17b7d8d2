use anyhow::Result;
use serde_json::Value;

use crate::models::ChatRequest;

/// Trait for AI chat providers (OpenRouter, test doubles, etc.)
///
/// Implementations return the provider's response body untouched; making
/// sense of its shape is the normalizer's job.
#[async_trait::async_trait]
pub trait ChatService: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<Value>;
}
