//! Ollama HTTP client.

use crate::error::{LlmError, LlmResult};
use crate::provider::CompletionProvider;
use crate::types::*;
use async_trait::async_trait;
use reqwest::Client;
use sowline_config::OllamaConfig;
use std::time::Duration;
use tracing::{debug, info};

/// Client for a local or remote Ollama server.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    host: String,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Create a new client from configuration.
    pub fn from_config(config: &OllamaConfig, timeout_seconds: u64) -> LlmResult<Self> {
        Self::new(&config.host, &config.model, Duration::from_secs(timeout_seconds))
    }

    pub fn new(host: impl Into<String>, model: impl Into<String>, timeout: Duration) -> LlmResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LlmError::Http)?;

        Ok(Self {
            client,
            host: host.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn map_send_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_connect() {
            LlmError::ServerNotRunning {
                host: self.host.clone(),
            }
        } else if e.is_timeout() {
            LlmError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            LlmError::Http(e)
        }
    }

    /// List all available models.
    pub async fn list_models(&self) -> LlmResult<Vec<ModelInfo>> {
        let url = format!("{}/api/tags", self.host);
        debug!("Listing models from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError {
                status,
                message: text,
            });
        }

        let list: ListModelsResponse = response.json().await?;
        Ok(list.models)
    }

    /// Check if a specific model is available.
    pub async fn has_model(&self, model: &str) -> LlmResult<bool> {
        let models = self.list_models().await?;
        // Check both exact match and model without tag
        Ok(models
            .iter()
            .any(|m| m.name == model || m.name.starts_with(&format!("{}:", model))))
    }

    /// Generate text (non-streaming).
    pub async fn generate(&self, request: GenerateRequest) -> LlmResult<GenerateResponse> {
        let url = format!("{}/api/generate", self.host);
        debug!("Generating with model {}", request.model);

        let mut request = request;
        request.stream = false;

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();

            if text.contains("not found") || status.as_u16() == 404 {
                return Err(LlmError::ModelNotFound {
                    model: request.model,
                });
            }

            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let generate_response: GenerateResponse = response.json().await?;
        Ok(generate_response)
    }
}

#[async_trait]
impl CompletionProvider for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, prompt: &str) -> LlmResult<String> {
        let request = GenerateRequest::new(&self.model, prompt)
            .with_options(GenerateOptions::new().with_temperature(0.1));

        let response = self.generate(request).await?;
        if response.response.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        info!(
            "Ollama completion: {} chars from {}",
            response.response.len(),
            response.model
        );
        Ok(response.response)
    }

    async fn health_check(&self) -> LlmResult<()> {
        if !self.has_model(&self.model).await? {
            return Err(LlmError::ModelNotFound {
                model: self.model.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = OllamaConfig::default();
        let client = OllamaClient::from_config(&config, 30);
        assert!(client.is_ok());
        assert_eq!(client.unwrap().model(), "gpt-oss:20b");
    }

    #[test]
    fn test_host_trailing_slash_trimmed() {
        let client =
            OllamaClient::new("http://localhost:11434/", "mistral", Duration::from_secs(5)).unwrap();
        assert_eq!(client.host, "http://localhost:11434");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_reported() {
        // Port 9 (discard) is not an Ollama server on any sane test machine.
        let client =
            OllamaClient::new("http://127.0.0.1:9", "mistral", Duration::from_secs(2)).unwrap();
        assert!(matches!(
            client.health_check().await,
            Err(LlmError::ServerNotRunning { .. }) | Err(LlmError::Timeout { .. })
        ));
        assert!(client.complete("hello").await.is_err());
    }
}
