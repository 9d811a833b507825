//! The completion seam used by the AI fallback parser.

use crate::error::LlmResult;
use crate::gemini::GeminiClient;
use crate::ollama::OllamaClient;
use async_trait::async_trait;
use sowline_config::{LlmConfig, ProviderKind};
use std::sync::Arc;

/// A hosted or local model that turns one prompt into one block of text.
///
/// The output is untrusted free text; callers validate its shape themselves.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short provider name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Run a single completion.
    async fn complete(&self, prompt: &str) -> LlmResult<String>;

    /// Verify the provider is reachable and the configured model exists.
    async fn health_check(&self) -> LlmResult<()>;
}

/// Build the provider selected in the configuration.
pub fn provider_from_config(config: &LlmConfig) -> LlmResult<Arc<dyn CompletionProvider>> {
    let provider: Arc<dyn CompletionProvider> = match config.provider {
        ProviderKind::Gemini => Arc::new(GeminiClient::from_config(
            &config.gemini,
            config.timeout_seconds,
        )?),
        ProviderKind::Ollama => Arc::new(OllamaClient::from_config(
            &config.ollama,
            config.timeout_seconds,
        )?),
    };
    tracing::debug!("Using completion provider {}", provider.name());
    Ok(provider)
}
