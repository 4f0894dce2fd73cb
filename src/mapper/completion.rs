//! Text-completion collaborator.
//!
//! The mapper and the tax advisor only need "system prompt + user prompt in,
//! text out". [`CompletionClient`] is that seam; [`OpenAiClient`] speaks the
//! OpenAI-compatible chat-completions protocol, and any closure with the
//! same shape works as a stand-in (tests use closures).

use crate::error::{Error, Result};
use std::time::Duration;

/// Expert persona sent as the system message of every request.
pub const SYSTEM_PROMPT: &str =
    "You are an expert tax professional and CPA with deep knowledge of IRS regulations and tax law.";

/// A blocking string-in/string-out completion service.
pub trait CompletionClient {
    /// Complete `prompt` under the `system` persona.
    fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

impl<F> CompletionClient for F
where
    F: Fn(&str, &str) -> Result<String>,
{
    fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        self(system, prompt)
    }
}

/// Configuration for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Bearer token; required to send requests
    pub api_key: Option<String>,
    /// API base URL, without the trailing `/chat/completions`
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4".into(),
            temperature: 0.1,
            timeout_secs: 120,
        }
    }
}

impl CompletionConfig {
    /// Defaults overridden by `OPENAI_API_KEY`, `OPENAI_BASE_URL` and
    /// `OPENAI_MODEL` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.trim().is_empty() {
                config.api_key = Some(key.trim().to_string());
            }
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            if !url.trim().is_empty() {
                config.base_url = url.trim().to_string();
            }
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            if !model.trim().is_empty() {
                config.model = model.trim().to_string();
            }
        }
        config
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the API base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiClient {
    config: CompletionConfig,
    api_key: String,
    agent: ureq::Agent,
}

impl OpenAiClient {
    /// Create a client. Fails with [`Error::InvalidConfig`] when no API key
    /// is configured.
    pub fn new(config: CompletionConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::InvalidConfig("OPENAI_API_KEY is not set".into()))?;
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Ok(Self {
            config,
            api_key,
            agent,
        })
    }

    /// The client configuration.
    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt },
            ],
        });
        let body_str = serde_json::to_string(&body)?;

        log::debug!(
            "Completion request: model={} prompt_chars={}",
            self.config.model,
            prompt.len()
        );
        let resp = self
            .agent
            .post(&self.endpoint())
            .set("Content-Type", "application/json")
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_string(&body_str)
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => {
                    let detail = resp.into_string().unwrap_or_default();
                    Error::completion(format!("HTTP {}: {}", code, detail.trim()))
                },
                ureq::Error::Transport(t) => Error::completion(t),
            })?;

        let resp_str = resp.into_string()?;
        parse_chat_response(&resp_str)
    }
}

/// Extract `choices[0].message.content` from a chat-completions response.
pub fn parse_chat_response(body: &str) -> Result<String> {
    let json: serde_json::Value = serde_json::from_str(body)?;
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(|content| content.trim().to_string())
        .ok_or_else(|| Error::completion("response has no choices[0].message.content"))
}
