//! OpenAI-compatible chat-completions client

use super::backend::{truncate_body, BackendError, InferenceBackend};
use crate::config::{CloudBackendConfig, SecretString};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const BACKEND_NAME: &str = "OpenAI";

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Remote chat-completions backend
pub struct CloudClient {
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
    client: reqwest::Client,
}

impl CloudClient {
    pub fn new(model: impl Into<String>, api_key: Option<SecretString>) -> Self {
        let defaults = CloudBackendConfig::default();
        Self {
            api_key,
            base_url: defaults.base_url.clone(),
            model: model.into(),
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
            timeout: defaults.timeout(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &CloudBackendConfig) -> Self {
        Self::new(config.model.clone(), config.api_key.clone())
            .with_base_url(&config.base_url)
            .with_max_tokens(config.max_tokens)
            .with_temperature(config.temperature)
            .with_timeout(config.timeout())
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        })
    }
}

#[async_trait]
impl InferenceBackend for CloudClient {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let api_key = match &self.api_key {
            Some(key) if !key.is_empty() => key,
            _ => {
                return Err(BackendError::NotConfigured {
                    backend: BACKEND_NAME.to_string(),
                    reason: "API key not set".to_string(),
                })
            }
        };

        let url = self.endpoint();
        tracing::debug!(model = %self.model, url = %url, "Calling cloud backend");

        let reqwest_err =
            |e: reqwest::Error| BackendError::from_reqwest(BACKEND_NAME, &url, self.timeout, e);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose())
            .timeout(self.timeout)
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(reqwest_err)?;

        let status = response.status();
        let body = response.text().await.map_err(reqwest_err)?;

        if !status.is_success() {
            return Err(BackendError::Status {
                backend: BACKEND_NAME.to_string(),
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let completion: ChatCompletion =
            serde_json::from_str(&body).map_err(|e| BackendError::Decode {
                backend: BACKEND_NAME.to_string(),
                message: e.to_string(),
            })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| BackendError::Decode {
                backend: BACKEND_NAME.to_string(),
                message: "no message content in choices".to_string(),
            })?;

        tracing::debug!(response_len = content.len(), "Cloud backend call succeeded");
        Ok(content)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn name(&self) -> &str {
        BACKEND_NAME
    }
}
