//! Minimal blocking client for the OpenAI-compatible chat-completions API.

use anyhow::{Context, Result, anyhow};
use larder_core::config::OpenAiConfig;
use larder_core::error::{ErrorCode, LarderError};
use serde_json::Value;

/// Connection settings resolved from config + environment.
#[derive(Debug, Clone)]
pub struct ChatClient {
    api_key: String,
    base_url: String,
}

impl ChatClient {
    /// Build a client, reading the API key from the env var named in
    /// config.
    ///
    /// # Errors
    ///
    /// [`ErrorCode::MissingApiKey`] when the env var is unset or empty.
    pub fn from_config(config: &OpenAiConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(
                LarderError::with_detail(ErrorCode::MissingApiKey, &config.api_key_env).into(),
            );
        }
        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// POST one chat-completions request and return the first choice's
    /// message content.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status, or a reply
    /// missing the expected content field.
    pub fn complete(&self, model: &str, temperature: f64, messages: Value) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = ureq::post(&url)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .set("User-Agent", "larder-cli")
            .send_json(serde_json::json!({
                "model": model,
                "temperature": temperature,
                "messages": messages,
            }))
            .map_err(|err| anyhow!("chat-completions request failed for {url}: {err}"))?;

        let body: Value = response
            .into_json()
            .context("decode chat-completions JSON response")?;

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| anyhow!("chat-completions reply has no message content"))
    }
}
