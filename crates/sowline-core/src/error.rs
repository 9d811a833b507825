//! Error types for Sowline.

use thiserror::Error;

/// Core error type for Sowline domain operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown scope of work category: {0}")]
    UnknownCategory(String),

    #[error("Unknown loan type: {0} (expected fix_flip or new_construction)")]
    UnknownLoanType(String),

    #[error("Unknown parsing method: {0}")]
    UnknownParsingMethod(String),
}

/// Result type alias using Sowline's Error.
pub type Result<T> = std::result::Result<T, Error>;
