use anyhow::Result;
use async_trait::async_trait;

/// One opaque request/response exchange with a text-generation service.
/// Implementations live in `providers`; tests substitute deterministic
/// stubs so the surrounding pipeline stays testable.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String>;
}
