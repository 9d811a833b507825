//! Google Gemini HTTP client.

use crate::error::{LlmError, LlmResult};
use crate::provider::CompletionProvider;
use crate::types::{GeminiRequest, GeminiResponse};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use sowline_config::GeminiConfig;
use std::time::Duration;
use tracing::{debug, info, warn};

const API_VERSION: &str = "v1beta";

/// Client for the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a client from configuration, resolving the API key from the
    /// config file or the environment.
    pub fn from_config(config: &GeminiConfig, timeout_seconds: u64) -> LlmResult<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| LlmError::MissingApiKey {
            provider: "gemini".to_string(),
        })?;
        Self::new(
            &config.base_url,
            &config.model,
            api_key,
            Duration::from_secs(timeout_seconds),
        )
    }

    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> LlmResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LlmError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn model_url(&self) -> String {
        format!("{}/{}/models/{}", self.base_url, API_VERSION, self.model)
    }

    fn map_send_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else if e.is_connect() {
            LlmError::Connection(format!("unable to reach {}: {}", self.base_url, e))
        } else {
            LlmError::Http(e)
        }
    }

    async fn error_for_status(&self, response: reqwest::Response) -> LlmError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if status == StatusCode::NOT_FOUND {
            return LlmError::ModelNotFound {
                model: self.model.clone(),
            };
        }

        LlmError::ApiError {
            status: status.as_u16(),
            message: text,
        }
    }

    /// Send one generateContent request.
    pub async fn generate_content(&self, request: &GeminiRequest) -> LlmResult<GeminiResponse> {
        let url = format!("{}:generateContent", self.model_url());
        debug!("Generating with Gemini model {}", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(self.error_for_status(response).await);
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| LlmError::ParseError(e.to_string()))
    }
}

/// Text of the first candidate. A reply without any text is an error rather
/// than an empty completion.
fn reply_text(response: &GeminiResponse) -> LlmResult<String> {
    if let Some(reason) = response
        .candidates
        .first()
        .and_then(|c| c.finish_reason.as_deref())
        .filter(|reason| *reason != "STOP")
    {
        warn!("Gemini finished with reason {}", reason);
    }

    let text = response.text();
    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, prompt: &str) -> LlmResult<String> {
        let request = GeminiRequest::from_prompt(prompt).with_temperature(0.1);
        let response = self.generate_content(&request).await?;

        let text = reply_text(&response)?;
        info!("Gemini completion: {} chars from {}", text.len(), self.model);
        Ok(text)
    }

    async fn health_check(&self) -> LlmResult<()> {
        let response = self
            .client
            .get(self.model_url())
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(self.error_for_status(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_key_builds_client() {
        let config = GeminiConfig {
            api_key: Some("test-key".to_string()),
            ..GeminiConfig::default()
        };
        let client = GeminiClient::from_config(&config, 30).unwrap();
        assert_eq!(client.model(), "gemini-2.0-flash");
    }

    #[test]
    fn test_reply_text() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "[]"}]}, "finishReason": "STOP"}]}"#;
        let response: GeminiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(reply_text(&response).unwrap(), "[]");
    }

    #[test]
    fn test_blank_reply_is_an_empty_response() {
        for body in [
            r#"{"candidates": []}"#,
            r#"{"candidates": [{"content": {"parts": [{"text": "  \n"}]}, "finishReason": "SAFETY"}]}"#,
        ] {
            let response: GeminiResponse = serde_json::from_str(body).unwrap();
            let err = reply_text(&response).unwrap_err();
            assert!(matches!(err, LlmError::EmptyResponse));
            assert_eq!(err.to_string(), "Provider returned an empty response");
        }
    }

    #[test]
    fn test_model_url() {
        let client = GeminiClient::new(
            "https://generativelanguage.googleapis.com/",
            "gemini-2.0-flash",
            "k",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.model_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash"
        );
    }
}
