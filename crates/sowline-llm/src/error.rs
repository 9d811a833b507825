//! Error types for completion providers.

use thiserror::Error;

/// Errors that can occur when talking to a completion provider.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Request timeout.
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// The requested model is not available.
    #[error("Model not found: {model}")]
    ModelNotFound { model: String },

    /// Ollama server is not running.
    #[error("Ollama server is not running at {host}. Start it with 'ollama serve'.")]
    ServerNotRunning { host: String },

    /// Connection error - unable to reach the provider.
    #[error("Connection error: {0}")]
    Connection(String),

    /// No API key configured for a hosted provider.
    #[error("No API key configured for {provider}. Set it in the config file or the environment.")]
    MissingApiKey { provider: String },

    /// API returned an error response.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The provider answered but produced no text.
    #[error("Provider returned an empty response")]
    EmptyResponse,

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for completion operations.
pub type LlmResult<T> = Result<T, LlmError>;
