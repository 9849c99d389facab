//! Ollama-compatible local generate client

use super::backend::{truncate_body, BackendError, InferenceBackend};
use crate::config::SovereignBackendConfig;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const BACKEND_NAME: &str = "Ollama";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Locally hosted inference backend
pub struct SovereignClient {
    base_url: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl SovereignClient {
    pub fn new(base_url: &str, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            timeout: SovereignBackendConfig::default().timeout(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &SovereignBackendConfig) -> Self {
        Self::new(&config.base_url, config.model.clone()).with_timeout(config.timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

#[async_trait]
impl InferenceBackend for SovereignClient {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let url = self.endpoint();
        tracing::debug!(model = %self.model, url = %url, "Calling sovereign backend");

        let reqwest_err =
            |e: reqwest::Error| BackendError::from_reqwest(BACKEND_NAME, &url, self.timeout, e);

        let payload = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&payload)
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

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| BackendError::Decode {
                backend: BACKEND_NAME.to_string(),
                message: e.to_string(),
            })?;

        let content = parsed.response.ok_or_else(|| BackendError::Decode {
            backend: BACKEND_NAME.to_string(),
            message: "no response field".to_string(),
        })?;

        tracing::debug!(response_len = content.len(), "Sovereign backend call succeeded");
        Ok(content)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn name(&self) -> &str {
        BACKEND_NAME
    }
}
