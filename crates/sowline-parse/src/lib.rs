//! Sowline Parse - Scope-of-work document parsing.
//!
//! This crate provides:
//! - Format extraction (spreadsheet grid, PDF/Word/plain text)
//! - Keyword-based category normalization
//! - Column-based template parsing for spreadsheets
//! - AI fallback parsing through a [`sowline_llm::CompletionProvider`]
//! - [`SowParser`], which ties the stages together and never fails outright

pub mod ai;
mod error;
pub mod extract;
mod normalize;
mod parser;
pub mod template;

#[cfg(test)]
mod testing;

pub use error::{AiParseError, ExtractError, ExtractResult};
pub use extract::{mime_for_extension, FileKind, Grid};
pub use normalize::{normalize_category, CategoryNormalizer, CATEGORY_KEYWORDS};
pub use parser::{ParserOptions, SowParser};
pub use template::{parse_amount, ColumnMap, TemplateOutcome};
