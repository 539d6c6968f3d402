//! HTTP-backed `LlmClient` implementations for the supported providers.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::{json, Value};

use fitnexus_core::config::{LlmConfig, LlmProvider};

use crate::llm::LlmClient;

const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com";
const ANTHROPIC_DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_COMPLETION_TOKENS: u32 = 512;
// Matches the sampling the advice was tuned against.
const COMPLETION_TEMPERATURE: f64 = 0.7;

/// Builds the configured provider client. Config validation has already
/// guaranteed the provider-specific credentials are present.
pub fn client_from_config(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("failed to construct http client")?;

    let api_key = || -> Result<String> {
        config
            .api_key
            .as_ref()
            .map(|key| key.expose_secret().to_string())
            .ok_or_else(|| anyhow!("llm.api_key is not configured"))
    };

    let client: Box<dyn LlmClient> = match config.provider {
        LlmProvider::OpenAi => Box::new(OpenAiClient {
            http,
            base_url: base_url(config, OPENAI_DEFAULT_BASE_URL),
            api_key: api_key()?,
            model: config.model.clone(),
        }),
        LlmProvider::Anthropic => Box::new(AnthropicClient {
            http,
            base_url: base_url(config, ANTHROPIC_DEFAULT_BASE_URL),
            api_key: api_key()?,
            model: config.model.clone(),
        }),
        LlmProvider::Ollama => Box::new(OllamaClient {
            http,
            base_url: config
                .base_url
                .clone()
                .ok_or_else(|| anyhow!("llm.base_url is not configured"))?,
            model: config.model.clone(),
        }),
    };

    Ok(client)
}

fn base_url(config: &LlmConfig, default: &str) -> String {
    let url = config.base_url.clone().unwrap_or_else(|| default.to_string());
    url.trim_end_matches('/').to_string()
}

struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "temperature": COMPLETION_TEMPERATURE,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_message},
            ],
        });

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("openai request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("openai returned {status}: {detail}"));
        }

        let payload: Value =
            response.json().await.context("openai response was not valid JSON")?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("openai response carried no message content"))
    }
}

struct AnthropicClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "max_tokens": MAX_COMPLETION_TOKENS,
            "temperature": COMPLETION_TEMPERATURE,
            "system": system_prompt,
            "messages": [
                {"role": "user", "content": user_message},
            ],
        });

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .context("anthropic request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("anthropic returned {status}: {detail}"));
        }

        let payload: Value =
            response.json().await.context("anthropic response was not valid JSON")?;
        payload["content"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("anthropic response carried no text content"))
    }
}

struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "stream": false,
            "options": {"temperature": COMPLETION_TEMPERATURE},
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_message},
            ],
        });

        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url.trim_end_matches('/')))
            .json(&body)
            .send()
            .await
            .context("ollama request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("ollama returned {status}: {detail}"));
        }

        let payload: Value =
            response.json().await.context("ollama response was not valid JSON")?;
        payload["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("ollama response carried no message content"))
    }
}
