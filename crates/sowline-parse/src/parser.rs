//! The parse pipeline: template first, AI as the fallback.

use crate::ai::{build_prompt, items_from_response, truncate_chars};
use crate::error::AiParseError;
use crate::extract::{load_grid, load_text, FileKind};
use crate::normalize::CategoryNormalizer;
use crate::template::{parse_grid, TemplateOutcome};
use sowline_config::{Config, DEFAULT_MAX_PROMPT_CHARS, DEFAULT_MIN_DOCUMENT_CHARS};
use sowline_core::{ParsedSowItem, ParsingMethod, SowParseResult};
use sowline_llm::{provider_from_config, CompletionProvider, LlmError, LlmResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const MISSING_COLUMNS_WARNING: &str =
    "Could not find required columns (item/description and budget/cost). Falling back to AI parsing.";
const ZERO_ITEMS_WARNING: &str = "No valid items found in spreadsheet. Falling back to AI parsing.";

/// Tunables for a [`SowParser`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParserOptions {
    /// Characters of document text embedded in the AI prompt.
    pub max_prompt_chars: usize,
    /// Shorter documents are reported as empty without calling the AI.
    pub min_document_chars: usize,
    /// Upper bound on the single completion call.
    pub ai_timeout: Duration,
    /// Warn when labor + material disagrees with the budget amount.
    pub warn_on_cost_mismatch: bool,
    /// Allowed relative difference before that warning fires.
    pub cost_mismatch_tolerance: f64,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            min_document_chars: DEFAULT_MIN_DOCUMENT_CHARS,
            ai_timeout: Duration::from_secs(30),
            warn_on_cost_mismatch: true,
            cost_mismatch_tolerance: 0.01,
        }
    }
}

impl ParserOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_prompt_chars: config.parsing.max_prompt_chars,
            min_document_chars: config.parsing.min_document_chars,
            ai_timeout: Duration::from_secs(config.llm.timeout_seconds),
            warn_on_cost_mismatch: config.parsing.warn_on_cost_mismatch,
            cost_mismatch_tolerance: config.parsing.cost_mismatch_tolerance,
        }
    }
}

/// Turns uploaded scope-of-work documents into budget line items.
///
/// Both entry points are infallible: every failure is reported through the
/// returned [`SowParseResult`]'s `warnings` and `errors`. A parse makes at
/// most one completion call. The parser holds no mutable state and can be
/// shared behind an `Arc`.
pub struct SowParser {
    provider: Arc<dyn CompletionProvider>,
    normalizer: CategoryNormalizer,
    options: ParserOptions,
}

impl SowParser {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            normalizer: CategoryNormalizer::default(),
            options: ParserOptions::default(),
        }
    }

    /// Build the configured provider and options.
    pub fn from_config(config: &Config) -> LlmResult<Self> {
        let provider = provider_from_config(&config.llm)?;
        Ok(Self::new(provider).with_options(ParserOptions::from_config(config)))
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_normalizer(mut self, normalizer: CategoryNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn provider(&self) -> &Arc<dyn CompletionProvider> {
        &self.provider
    }

    /// Parse a document, trying column-based spreadsheet parsing first.
    ///
    /// Non-spreadsheets, and spreadsheets the template stage cannot handle,
    /// are passed to [`SowParser::parse_with_ai`]. Warnings and errors from
    /// the template stage are kept in the final result.
    pub async fn parse_template(&self, buffer: &[u8], file_type: &str) -> SowParseResult {
        let kind = FileKind::detect(file_type);
        if kind != FileKind::Spreadsheet {
            debug!("{} input is not a spreadsheet, using AI parsing", kind.as_str());
            return self.ai_with_context(buffer, kind, Vec::new(), Vec::new()).await;
        }

        let outcome = match load_grid(buffer).await {
            Ok(grid) => parse_grid(&grid, &self.normalizer),
            Err(e) => TemplateOutcome::Failed(e.to_string()),
        };

        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        match outcome {
            TemplateOutcome::Parsed(items) => {
                info!("Template parsing produced {} items", items.len());
                warnings.extend(self.cost_warnings(&items));
                return SowParseResult::new(ParsingMethod::Template, items, warnings, errors);
            }
            TemplateOutcome::ColumnsMissing(columns) => {
                warn!("Template columns not found: {:?}", columns);
                warnings.push(MISSING_COLUMNS_WARNING.to_string());
            }
            TemplateOutcome::ZeroItems => {
                warn!("Template parsing found no valid rows");
                warnings.push(ZERO_ITEMS_WARNING.to_string());
            }
            TemplateOutcome::Failed(message) => {
                warn!("Template parsing failed: {}", message);
                errors.push(format!("Template parsing failed: {}", message));
            }
        }

        self.ai_with_context(buffer, kind, warnings, errors).await
    }

    /// Parse a document with the completion provider only.
    pub async fn parse_with_ai(&self, buffer: &[u8], file_type: &str) -> SowParseResult {
        self.ai_with_context(buffer, FileKind::detect(file_type), Vec::new(), Vec::new())
            .await
    }

    async fn ai_with_context(
        &self,
        buffer: &[u8],
        kind: FileKind,
        mut warnings: Vec<String>,
        mut errors: Vec<String>,
    ) -> SowParseResult {
        match self.run_ai(buffer, kind, &mut warnings).await {
            Ok(items) => {
                info!(
                    "AI parsing via {} produced {} items",
                    self.provider.name(),
                    items.len()
                );
                warnings.extend(self.cost_warnings(&items));
                SowParseResult::new(ParsingMethod::Ai, items, warnings, errors)
            }
            Err(e) => {
                warn!("AI parsing failed: {}", e);
                errors.push(e.to_string());
                SowParseResult::failed(ParsingMethod::Ai, warnings, errors)
            }
        }
    }

    async fn run_ai(
        &self,
        buffer: &[u8],
        kind: FileKind,
        warnings: &mut Vec<String>,
    ) -> Result<Vec<ParsedSowItem>, AiParseError> {
        let min_chars = self.options.min_document_chars;
        if buffer.len() < min_chars {
            return Err(AiParseError::EmptyDocument);
        }

        let text = load_text(buffer, kind).await?;
        let total_chars = text.chars().count();
        if total_chars < min_chars {
            return Err(AiParseError::EmptyDocument);
        }

        let max_chars = self.options.max_prompt_chars;
        let (excerpt, truncated) = truncate_chars(&text, max_chars);
        if truncated {
            warnings.push(format!(
                "Document truncated for AI parsing: sent the first {} of {} characters",
                max_chars, total_chars
            ));
        }

        let prompt = build_prompt(excerpt);
        debug!(
            "Sending {} character prompt to {}",
            prompt.len(),
            self.provider.name()
        );

        let timeout = self.options.ai_timeout;
        let response = tokio::time::timeout(timeout, self.provider.complete(&prompt))
            .await
            .map_err(|_| LlmError::Timeout {
                seconds: timeout.as_secs(),
            })??;

        items_from_response(&response, &self.normalizer)
    }

    fn cost_warnings(&self, items: &[ParsedSowItem]) -> Vec<String> {
        if !self.options.warn_on_cost_mismatch {
            return Vec::new();
        }

        let tolerance = self.options.cost_mismatch_tolerance;
        items
            .iter()
            .filter_map(|item| {
                let breakdown = item.breakdown_total()?;
                let diff = (breakdown - item.budget_amount).abs();
                (diff > tolerance * item.budget_amount).then(|| {
                    format!(
                        "Line item '{}': labor + material ({:.2}) differs from budget ({:.2})",
                        item.item_name, breakdown, item.budget_amount
                    )
                })
            })
            .collect()
    }
}
