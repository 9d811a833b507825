//! Sowline LLM - Text completion providers.
//!
//! The parser only needs "prompt in, text out", so every backend is exposed
//! through the [`CompletionProvider`] trait. Two HTTP backends ship here:
//! Google Gemini and a local Ollama server.

mod error;
mod gemini;
mod ollama;
mod provider;
mod types;

pub use error::{LlmError, LlmResult};
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use provider::{provider_from_config, CompletionProvider};
pub use types::*;
