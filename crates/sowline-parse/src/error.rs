//! Error types for the parsing pipeline.
//!
//! These never leave [`crate::SowParser`]'s public entry points; they are
//! rendered into the result's `errors` list instead.

use sowline_llm::LlmError;
use thiserror::Error;

/// Result type for format extraction.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors raised while reading a document buffer.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("Failed to extract text from PDF: {0}")]
    Pdf(String),

    #[error("Failed to read Word document: {0}")]
    Word(String),

    #[error("Document reader crashed: {0}")]
    Task(String),
}

/// Failures of the AI fallback stage.
#[derive(Error, Debug)]
pub enum AiParseError {
    #[error("Document appears to be empty or could not be read")]
    EmptyDocument,

    #[error("AI could not extract structured data from document")]
    NoStructuredData,

    #[error("AI response was not an array of items")]
    NotAnArray,

    #[error("No valid items extracted from document")]
    NoValidItems,

    #[error("AI parsing failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("AI parsing failed: {0}")]
    Provider(#[from] LlmError),

    #[error("AI parsing failed: {0}")]
    Json(#[from] serde_json::Error),
}
